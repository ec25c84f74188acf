use self::super::{
	Parser, ParserOptions, parse,
	lexer::TokenStream,
	syntax::{
		Arguments, BinaryOp, Block, Expression, Field, FunctionCall, FunctionName,
		LastStatement, PrefixExpression, Statement, UnaryOp, Variable
	}
};

fn returned(source: &str) -> Expression {
	match parse(&format!("return {}", source)).unwrap().last {
		Some(LastStatement::Return(mut values)) => values.remove(0),
		last => panic!("expected a return, got {:?}", last)
	}
}

fn name(identifier: &str) -> Expression {
	Expression::Prefix(PrefixExpression::Variable(Box::new(
		Variable::Identifier(identifier.to_owned()))))
}

fn binary(operator: BinaryOp, left: Expression, right: Expression) -> Expression {
	Expression::BinaryOp(operator, Box::new(left), Box::new(right))
}

fn number(number: f64) -> Expression {
	Expression::Number(number)
}

fn error(source: &str) -> String {
	parse(source).unwrap_err().message
}

#[test]
fn multiplication_binds_tighter() {
	assert_eq!(returned("1 + 2 * 3"), binary(BinaryOp::Add, number(1.0),
		binary(BinaryOp::Multiply, number(2.0), number(3.0))));
	assert_eq!(returned("1 * 2 + 3"), binary(BinaryOp::Add,
		binary(BinaryOp::Multiply, number(1.0), number(2.0)), number(3.0)));
}

#[test]
fn subtraction_is_left_associative() {
	assert_eq!(returned("a - b - c"), binary(BinaryOp::Subtract,
		binary(BinaryOp::Subtract, name("a"), name("b")), name("c")));
}

#[test]
fn power_and_concat_are_right_associative() {
	assert_eq!(returned("2 ^ 2 ^ 3"), binary(BinaryOp::Power, number(2.0),
		binary(BinaryOp::Power, number(2.0), number(3.0))));
	assert_eq!(returned("a .. b .. c"), binary(BinaryOp::Concat, name("a"),
		binary(BinaryOp::Concat, name("b"), name("c"))));
}

#[test]
fn unary_operators() {
	assert_eq!(returned("-2 ^ 2"), Expression::UnaryOp(UnaryOp::Negate,
		Box::new(binary(BinaryOp::Power, number(2.0), number(2.0)))));
	assert_eq!(returned("-2 * 2"), binary(BinaryOp::Multiply,
		Expression::UnaryOp(UnaryOp::Negate, Box::new(number(2.0))), number(2.0)));
	assert_eq!(returned("not a == b"), binary(BinaryOp::Equal,
		Expression::UnaryOp(UnaryOp::Not, Box::new(name("a"))), name("b")));
	assert_eq!(returned("2 ^ -3"), binary(BinaryOp::Power, number(2.0),
		Expression::UnaryOp(UnaryOp::Negate, Box::new(number(3.0)))));
}

#[test]
fn logical_operators() {
	assert_eq!(returned("a or b and c"), binary(BinaryOp::Or, name("a"),
		binary(BinaryOp::And, name("b"), name("c"))));
	assert_eq!(returned("a < b == c"), binary(BinaryOp::Equal,
		binary(BinaryOp::Less, name("a"), name("b")), name("c")));
}

#[test]
fn parenthesis_are_kept() {
	assert_eq!(returned("(a)"), Expression::Prefix(
		PrefixExpression::Expression(Box::new(name("a")))));
}

#[test]
fn ambiguous_function_call() {
	assert!(error("f\n(g)()").starts_with("ambiguous syntax"));
	assert!(parse("f(g)\n(h)()").is_err());
	assert!(parse("local x = f\n;(g)()").is_ok());

	// Only where the callee ends counts, not where it starts.
	assert!(parse("x = f[[a\nb]](g)").is_ok());
	assert!(parse("x = f 'a\\\nb'(g)").is_ok());
	assert!(error("x = f[[a\nb]]\n(g)").starts_with("ambiguous syntax"));
}

#[test]
fn for_loops() {
	let block = parse("for i = 1, 10 do end for k, v in pairs(t) do end for k in t do end")
		.unwrap();

	match &block.statements[0] {
		Statement::ForNormal {identifier, step: None, ..} => assert_eq!(identifier, "i"),
		statement => panic!("expected a numeric for, got {:?}", statement)
	}
	match &block.statements[1] {
		Statement::ForIn {identifiers, values, ..} => {
			assert_eq!(identifiers, &["k", "v"]);
			assert_eq!(values.len(), 1);
		},
		statement => panic!("expected a generic for, got {:?}", statement)
	}
	assert!(matches!(&block.statements[2], Statement::ForIn {..}));
}

#[test]
fn numeric_for_with_step() {
	let block = parse("for i = 10, 1, -1 do print(i) end").unwrap();
	match &block.statements[0] {
		Statement::ForNormal {step: Some(step), body, ..} => {
			assert_eq!(step, &Expression::UnaryOp(UnaryOp::Negate,
				Box::new(number(1.0))));
			assert_eq!(body.statements.len(), 1);
		},
		statement => panic!("expected a numeric for, got {:?}", statement)
	}
}

#[test]
fn number_literals() {
	assert_eq!(returned("0x10"), number(16.0));
	assert_eq!(returned("0XfF"), number(255.0));
	assert_eq!(returned("1.5e2"), number(150.0));
	assert_eq!(returned(".5"), number(0.5));
	assert_eq!(returned("10e500"), number(f64::INFINITY));
}

#[test]
fn malformed_numbers() {
	assert_eq!(error("return 1.5e500"), "malformed number near '1.5e500'");
	assert_eq!(error("return 3x"), "malformed number near '3x'");
	assert_eq!(error("return 0x"), "malformed number near '0x'");
}

#[test]
fn table_constructors() {
	let fields = match returned("{1; 2, x = 3, [4] = 5,}") {
		Expression::Table(fields) => fields,
		expression => panic!("expected a table, got {:?}", expression)
	};

	assert_eq!(fields, vec![
		Field::Normal(number(1.0)),
		Field::Normal(number(2.0)),
		Field::MemberId("x".to_owned(), number(3.0)),
		Field::MemberExpr(number(4.0), number(5.0))
	]);
	assert_eq!(returned("{}"), Expression::Table(Vec::new()));
	assert!(error("return {f() = 1}").starts_with("unexpected symbol"));
	assert!(error("return {1 2}").starts_with("unexpected symbol near '2'"));
}

#[test]
fn call_arguments() {
	let block = parse("f{1} f'x' obj:m()").unwrap();
	let calls = block.statements.iter().map(|statement| match statement {
		Statement::FunctionCall(call) => call.clone(),
		statement => panic!("expected a call, got {:?}", statement)
	}).collect::<Vec<_>>();

	assert!(matches!(&calls[0], FunctionCall::Normal(_, Arguments::Table(_))));
	assert!(matches!(&calls[1], FunctionCall::Normal(_, Arguments::String(string))
		if string == "x"));
	assert!(matches!(&calls[2], FunctionCall::Table(_, method, Arguments::Normal(arguments))
		if method == "m" && arguments.is_empty()));
}

#[test]
fn function_names() {
	let block = parse("function a.b.c:m(x, ...) end").unwrap();
	match &block.statements[0] {
		Statement::Function {name, body} => {
			assert_eq!(name, &FunctionName {
				identifiers: vec!["a".to_owned(), "b".to_owned(), "c".to_owned()],
				method: Some("m".to_owned())
			});
			assert_eq!(body.parameters, vec!["x".to_owned()]);
			assert!(body.varargs);
		},
		statement => panic!("expected a function, got {:?}", statement)
	}
}

#[test]
fn assignments() {
	let block = parse("a, b.c, d[1] = 1, 2 local x, y local z = 3").unwrap();
	assert!(matches!(&block.statements[0], Statement::Assign {variables, values}
		if variables.len() == 3 && values.len() == 2));
	assert!(matches!(&block.statements[1], Statement::LocalAssign {values: None, ..}));
	assert!(matches!(&block.statements[2], Statement::LocalAssign {values: Some(_), ..}));

	assert!(error("f() = 1").starts_with("unexpected symbol"));
	assert!(error("x").starts_with("unexpected symbol"));
}

#[test]
fn last_statements() {
	let block = parse("if a then return else return 1 end while true do break end")
		.unwrap();
	match &block.statements[0] {
		Statement::If {body, else_body: Some(else_body), ..} => {
			assert_eq!(body.last, Some(LastStatement::Return(Vec::new())));
			assert_eq!(else_body.last, Some(LastStatement::Return(vec![number(1.0)])));
		},
		statement => panic!("expected an if, got {:?}", statement)
	}

	assert!(error("return 1 x = 2").contains("'<eof>' expected"));
	assert_eq!(parse("return;").unwrap().last, Some(LastStatement::Return(Vec::new())));
}

#[test]
fn empty_chunk() {
	assert_eq!(parse("").unwrap(), Block::default());
	assert_eq!(parse("-- nothing\n;;").unwrap(), Block::default());
}

#[test]
fn incomplete_source() {
	let error = parse("if x then").unwrap_err();
	assert_eq!(error.message, "'end' expected near '<eof>'");
	assert!(error.is_incomplete());
	assert!(!parse("x = = 1").unwrap_err().is_incomplete());
	assert!(parse("x = 'abc").unwrap_err().is_incomplete());
}

#[test]
fn error_positions() {
	let error = parse("local x = 1\nlocal y = )").unwrap_err();
	assert_eq!((error.line, error.column), (2, 11));
	assert_eq!(error.to_string(), "2:11: unexpected symbol near ')'");
}

#[test]
fn nesting_limit() {
	let nested = format!("return {}1{}", "(".repeat(20), ")".repeat(20));
	assert!(parse(&nested).is_ok());

	let limited = Parser::new(TokenStream::from_source(&nested).unwrap())
		.with_options(ParserOptions {max_depth: 10})
		.parse().unwrap_err();
	assert_eq!(limited.message, "chunk has too many syntax levels");

	let blocks = format!("{}{}", "do ".repeat(300), "end ".repeat(300));
	assert_eq!(error(&blocks), "chunk has too many syntax levels");
}

#[test]
fn right_associative_chains_are_limited() {
	let concat = format!("return 1{}", " .. 1".repeat(300));
	assert_eq!(error(&concat), "chunk has too many syntax levels");
	let power = format!("return 2{}", " ^ 2".repeat(300));
	assert_eq!(error(&power), "chunk has too many syntax levels");

	// Left associative chains fold in a loop and may be any length.
	let sum = format!("return 1{}", " + 1".repeat(300));
	assert!(parse(&sum).is_ok());
	assert!(parse(&format!("return 1{}", " .. 1".repeat(100))).is_ok());
}

#[test]
fn printing_parses_back() {
	let source = r#"
		local t = {1, 2; x = "a\"b\n", [f(1)] = -(-x)}
		function t.a.b:m(p, ...) return p ^ -2 .. "x", ... end
		local function g() end
		for i = 1, #t, 2 do t[i] = not t[i] or i % 2 end
		for k, v in pairs(t) do print(k, v) end
		while a < b and b >= c do a = a + 1 break end
		repeat x = x - 1 until x <= 0
		if a then b() elseif c then d{} else e"s" end
		do local a, b end
		;(f or g)(1e300, 0.1, 10e500)
		return (a), - -b
	"#;
	let block = parse(source).unwrap();
	let printed = block.to_string();
	assert_eq!(parse(&printed).unwrap(), block, "printed as:\n{}", printed);
}

include!(concat!(env!("OUT_DIR"), "/codegen/selenite-tests-round_trip-main"));

use teenycli::{ArgP, Argument, Bundle, Command};

fn add(bundle: Bundle) -> i64 {
    bundle.get::<i64>("left").unwrap() + bundle.get::<i64>("right").unwrap()
}

fn sub(bundle: Bundle) -> i64 {
    bundle.get::<i64>("left").unwrap() - bundle.get::<i64>("right").unwrap()
}

fn main() {
    let mut argp: ArgP<i64> = ArgP::new("calc").about("Add or subtract two integers.");

    for (name, handler, help) in [
        ("add", add as fn(Bundle) -> i64, "Compute LEFT + RIGHT."),
        ("sub", sub, "Compute LEFT - RIGHT."),
    ] {
        argp.subcmd(Command::new(name, handler).help(help))
            .unwrap()
            .add(Argument::new(["left"]).convert::<i64>())
            .unwrap()
            .add(Argument::new(["right"]).convert::<i64>())
            .unwrap();
    }

    let result = argp.dispatch(None).unwrap();
    println!("{result}");
}

use teenycli::term::Palette;
use teenycli::{ArgP, Argument, Arity, Bundle, Command};

fn commit(palette: Palette, bundle: Bundle) {
    let paths = bundle.get::<Vec<String>>("paths").unwrap();

    if paths.is_empty() {
        palette.warn("nothing to commit");
        return;
    }

    println!(
        "[{}] {} ({} files)",
        palette.cyan(bundle.get::<String>("change").unwrap()),
        bundle.get::<String>("message").unwrap(),
        paths.len()
    );
}

fn main() {
    let palette = Palette::detect();
    let mut argp: ArgP = ArgP::new("git-like").version("git-like 0.1.0");
    argp.add(
        Argument::new(["-C"])
            .dest("change")
            .default(".")
            .help("Run as if started in this directory."),
    )
    .unwrap();
    argp.subcmd(Command::new("commit", move |bundle| commit(palette, bundle)).help("Record changes."))
        .unwrap()
        .add(
            Argument::new(["-m", "--message"])
                .required(true)
                .help("The commit message."),
        )
        .unwrap()
        .add(Argument::new(["--amend"]).help("Replace the tip of the current branch."))
        .unwrap()
        .add(
            Argument::new(["paths"])
                .arity(Arity::Many)
                .required(false)
                .help("The files to commit."),
        )
        .unwrap();

    if let Err(error) = argp.dispatch(None) {
        palette.bail(&error.to_string());
    }
}

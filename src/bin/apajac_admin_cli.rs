use apajac_admin::{cli::run_cli, init};

fn main() {
    init();

    if let Err(err) = run_cli() {
        eprintln!("Erro: {err}");
        std::process::exit(1);
    }
}

use terafoundation::app;

fn main() {
    std::process::exit(app::run());
}

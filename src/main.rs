fn main() {
    diffgrade::cli::run_grade();
}

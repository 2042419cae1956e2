// Secondary entry point: concatenates the tests arrays of several results
// files into one. Usage: combine-results results1.json results2.json -o results.json

fn main() {
    diffgrade::cli::run_combine();
}

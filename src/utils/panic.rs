/// Colorized panic reports with backtraces, installed before anything else runs
pub fn setup() {
    color_backtrace::install();
}

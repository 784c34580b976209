use std::error::Error;

fn main() -> Result<(), Box<dyn Error>> {
    feedback_analysis::example_apps::run_feedback_demo(std::env::args().skip(1))
}

use std::error::Error;

fn main() -> Result<(), Box<dyn Error>> {
    chatbox::cli::main()
}

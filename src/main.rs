mod assembly;
mod command;
mod thread;

fn main() {
    env_logger::init();
    command::args_handle();
}

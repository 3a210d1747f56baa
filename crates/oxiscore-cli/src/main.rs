mod command;
mod data;
mod logger;
mod report;

fn main() -> anyhow::Result<()> {
    logger::init_logging("info");
    command::run()
}

use studybuddy::app;

fn main() -> anyhow::Result<()> {
    app::run()
}

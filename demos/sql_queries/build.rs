use tracing_subscriber::EnvFilter;

fn main() -> miette::Result<()> {
	let filter = EnvFilter::try_from_env("EMBEDRES_LOG").unwrap_or_else(|_| EnvFilter::new("warn"));
	tracing_subscriber::fmt()
		.with_env_filter(filter)
		.with_writer(std::io::stderr)
		.without_time()
		.init();

	embedres_core::build_script::generate()?;

	Ok(())
}

use std::path::Path;

pub fn run(root: &Path, port: u16) -> anyhow::Result<()> {
    let runtime = tokio::runtime::Runtime::new()?;
    runtime.block_on(faultline_server::serve(root.to_path_buf(), port))
}

/// Bundles the plugin through nih_plug_xtask:
///
///   cargo xtask bundle haas-delay --release
///
/// The CLAP and VST3 bundles land in `target/bundled/`.
fn main() -> nih_plug_xtask::Result<()> {
    nih_plug_xtask::main()
}

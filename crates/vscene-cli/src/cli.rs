use std::path::PathBuf;

use bpaf::Bpaf;

#[derive(Clone, Debug, Bpaf)]
#[bpaf(options)]
pub struct Args {
    /// Enable verbose logging.
    #[bpaf(short('v'), long)]
    pub verbose: bool,

    #[bpaf(external(command))]
    pub command: Command,
}

#[derive(Clone, Debug, Bpaf)]
pub enum Command {
    /// Interpret a script and write its packed scene as an archive directory.
    #[bpaf(command("build"))]
    Build {
        #[bpaf(positional("SCRIPT"))]
        script: PathBuf,

        #[bpaf(short('o'), long)]
        out: PathBuf,
    },

    /// Interpret a script and print scene statistics without writing anything.
    #[bpaf(command("inspect"))]
    Inspect {
        #[bpaf(positional("SCRIPT"))]
        script: PathBuf,
    },

    /// Build a scene, write it to an archive, read the archive back, and report
    /// whether the two scenes agree.
    #[bpaf(command("roundtrip"))]
    Roundtrip {
        #[bpaf(positional("SCRIPT"))]
        script: PathBuf,

        #[bpaf(short('o'), long)]
        archive_dir: PathBuf,
    },
}

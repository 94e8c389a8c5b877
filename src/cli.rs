use clap::{Arg, ArgAction, Command};
use log::debug;
use std::time::Instant;

pub fn build_cli() -> Command {
    debug!("⚙️ Building CLI interface...");
    let start_time = Instant::now();
    let dataset_arg = Arg::new("dataset")
        .long("dataset")
        .value_name("DIR")
        .help("Dataset root holding one directory per camera (default: from config, 'dataset')")
        .action(ArgAction::Set);

    let cmd = Command::new("rcalib")
        .version("0.1.0")
        .about("Operator utilities for calibrating a multi-camera rig and driving its edge hosts.")
        .subcommand_required(true)
        .arg_required_else_help(true)
        .arg(
            Arg::new("config")
                .short('c')
                .long("config")
                .value_name("FILE")
                .help("Sets a custom configuration file")
                .global(true)
                .action(ArgAction::Set)
        )
        .arg(
            Arg::new("debug")
                .short('d')
                .long("debug")
                .help("Enable debug logging")
                .global(true)
                .action(ArgAction::SetTrue)
        )
        .subcommand(
            Command::new("capture-images")
                .about("Captures timestamped color frames from the depth camera into a folder")
                .arg(Arg::new("folder").value_name("FOLDER").required(true).help("Folder name to save images").action(ArgAction::Set))
                .arg(Arg::new("keep-existing").long("keep-existing").help("Do not delete files already in FOLDER").action(ArgAction::SetTrue))
                .arg(Arg::new("serial").long("serial").value_name("SN").help("Serial number of the camera to use (default: first found)").action(ArgAction::Set))
        )
        .subcommand(
            Command::new("rename-dirs")
                .about("Renames dataset directories to cam0..camN-1 in sorted order")
                .arg(dataset_arg.clone())
        )
        .subcommand(
            Command::new("calib-command")
                .about("Prints the calibration tool invocation for the dataset directories")
                .arg(dataset_arg)
        )
        .subcommand(
            Command::new("run-script")
                .about("Runs a local script on the edge hosts over ssh")
                .arg(Arg::new("script").value_name("SCRIPT").required(true).help("Path to the script, relative to the rcalib binary's directory").action(ArgAction::Set))
                .arg(
                    Arg::new("hosts")
                        .long("hosts")
                        .value_name("N")
                        .num_args(1..)
                        .value_parser(clap::value_parser!(u32))
                        .help("Edge device numbers; hosts whose name contains any of them are selected (default: all)")
                        .action(ArgAction::Append)
                )
                .arg(Arg::new("user").long("user").value_name("USER").help("Username for ssh connections (default: from config, 'lab')").action(ArgAction::Set))
                .arg(Arg::new("keep-going").long("keep-going").help("Continue with remaining hosts after a failure").action(ArgAction::SetTrue))
        );
    debug!("✅ CLI interface built in {:?}", start_time.elapsed());
    cmd
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cli_definition_is_consistent() {
        build_cli().debug_assert();
    }

    #[test]
    fn run_script_collects_hosts_and_user() {
        let matches = build_cli()
            .try_get_matches_from(["rcalib", "run-script", "setup.fish", "--hosts", "1", "3", "--user", "ops"])
            .unwrap();
        let (name, sub) = matches.subcommand().unwrap();
        assert_eq!(name, "run-script");
        assert_eq!(sub.get_one::<String>("script").unwrap(), "setup.fish");
        let hosts: Vec<u32> = sub.get_many::<u32>("hosts").unwrap().copied().collect();
        assert_eq!(hosts, vec![1, 3]);
        assert_eq!(sub.get_one::<String>("user").unwrap(), "ops");
        assert!(!sub.get_flag("keep-going"));
    }

    #[test]
    fn capture_requires_folder() {
        assert!(build_cli().try_get_matches_from(["rcalib", "capture-images"]).is_err());
        let matches = build_cli()
            .try_get_matches_from(["rcalib", "-d", "capture-images", "left", "--keep-existing"])
            .unwrap();
        assert!(matches.get_flag("debug"));
        let (_, sub) = matches.subcommand().unwrap();
        assert_eq!(sub.get_one::<String>("folder").unwrap(), "left");
        assert!(sub.get_flag("keep-existing"));
    }

    #[test]
    fn hosts_must_be_integers() {
        assert!(build_cli()
            .try_get_matches_from(["rcalib", "run-script", "s.fish", "--hosts", "edge1"])
            .is_err());
    }
}

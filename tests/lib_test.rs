//! Library integration tests.

use devbootstrap::BootstrapError;

#[test]
fn error_types_are_public() {
    let err = BootstrapError::UnknownApplication {
        id: "emacs".into(),
    };
    assert!(err.to_string().contains("emacs"));
}

#[test]
fn result_type_alias_is_public() {
    fn test_fn() -> devbootstrap::Result<()> {
        Ok(())
    }
    assert!(test_fn().is_ok());
}

#[test]
fn cli_types_are_public() {
    use devbootstrap::cli::{Cli, Commands};
    use clap::Parser;

    let cli = Cli::parse_from(["devbootstrap", "list", "--json"]);
    if let Some(Commands::List(args)) = cli.command {
        assert!(args.json);
    } else {
        panic!("Expected List command");
    }
}

#[test]
fn catalog_is_public_and_ordered() {
    let ids: Vec<String> = devbootstrap::apps::catalog().into_iter().map(|a| a.id).collect();
    assert_eq!(ids.first().map(String::as_str), Some("docker"));
    assert_eq!(ids.len(), 7);
}

#[test]
fn factory_rejects_unknown_ids() {
    use devbootstrap::installer::resolve;
    use devbootstrap::platform::{Architecture, OsType, Platform};

    let platform = Platform::new(OsType::MacOs, Architecture::Arm64, "/Users/dev");
    assert!(resolve("docker", &platform).is_ok());
    assert!(matches!(
        resolve("emacs", &platform),
        Err(BootstrapError::UnknownApplication { .. })
    ));
}

use clap::{Args, Parser, Subcommand};
use std::net::SocketAddr;
use std::time::Duration;

use alerttrail_push::config::{
    AppConfig, DEFAULT_APP_NAME, DEFAULT_COOLDOWN_MINUTES, DispatchPolicy, QuietHours,
};

#[allow(clippy::large_enum_variant)]
pub(crate) enum RunOutcome {
    Serve(AppConfig),
    Exit(i32),
}

pub(crate) fn run() -> RunOutcome {
    resolve(Cli::parse())
}

#[derive(Parser, Debug)]
#[command(
    name = "alerttrail-push",
    version,
    about = "Companion server for AlertTrail web push notifications"
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
    #[arg(long, env = "ALERTTRAIL_BIND", default_value = "127.0.0.1:3000")]
    bind: SocketAddr,
    #[arg(long, default_value = DEFAULT_APP_NAME)]
    app_name: String,
    #[arg(long, env = "ALERTTRAIL_VAPID_PRIVATE_KEY")]
    vapid_private_key: Option<String>,
    #[arg(long, env = "ALERTTRAIL_VAPID_PUBLIC_KEY")]
    vapid_public_key: Option<String>,
    #[arg(long, env = "ALERTTRAIL_VAPID_SUBJECT")]
    vapid_subject: Option<String>,
    /// Minutes between two pushes to the same subscription.
    #[arg(long, env = "ALERTTRAIL_COOLDOWN_MIN", default_value_t = DEFAULT_COOLDOWN_MINUTES)]
    cooldown_minutes: u64,
    /// UTC hours during which alerts are held, e.g. `22-7`.
    #[arg(long, env = "ALERTTRAIL_QUIET_HOURS", value_parser = parse_quiet_hours)]
    quiet_hours: Option<QuietHours>,
}

fn parse_quiet_hours(raw: &str) -> Result<QuietHours, String> {
    QuietHours::parse(raw).ok_or_else(|| format!("expected START-END hours below 24, got `{raw}`"))
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Generate a VAPID key pair.
    Init(InitArgs),
}

#[derive(Args, Debug)]
struct InitArgs {
    #[arg(long)]
    subject: Option<String>,
}

fn resolve(cli: Cli) -> RunOutcome {
    if let Some(Command::Init(args)) = cli.command {
        return RunOutcome::Exit(run_init(args));
    }

    let app_name = cli.app_name.trim();
    if app_name.is_empty() {
        eprintln!("error: --app-name cannot be empty");
        return RunOutcome::Exit(2);
    }

    RunOutcome::Serve(AppConfig {
        bind: cli.bind,
        app_name: app_name.to_string(),
        vapid_private_key: cli.vapid_private_key,
        vapid_public_key: cli.vapid_public_key,
        vapid_subject: cli.vapid_subject,
        dispatch: DispatchPolicy {
            enabled: true,
            cooldown: Duration::from_secs(cli.cooldown_minutes.saturating_mul(60)),
            quiet_hours: cli.quiet_hours,
        },
    })
}

fn run_init(args: InitArgs) -> i32 {
    let credentials = match alerttrail_push::generate_vapid_credentials() {
        Ok(credentials) => credentials,
        Err(err) => {
            eprintln!("failed to generate VAPID credentials: {err}");
            return 1;
        }
    };
    let (subject, show_subject_note) = match args.subject {
        Some(subject) => (subject, false),
        None => ("mailto:you@example.com".to_string(), true),
    };

    println!("VAPID credentials generated.");
    println!();
    println!("ALERTTRAIL_VAPID_PRIVATE_KEY=\"{}\"", credentials.private_key);
    println!("ALERTTRAIL_VAPID_PUBLIC_KEY=\"{}\"", credentials.public_key);
    println!("ALERTTRAIL_VAPID_SUBJECT=\"{subject}\"");
    if show_subject_note {
        println!();
        println!("Note: replace ALERTTRAIL_VAPID_SUBJECT with a contact URI you control.");
    }
    0
}

#[cfg(test)]
#[allow(non_snake_case)]
mod tests {
    use super::*;

    #[test]
    fn cli__should_apply_defaults() {
        // When
        let cli = Cli::try_parse_from(["alerttrail-push"]).expect("parse cli");

        // Then
        assert!(cli.command.is_none());
        assert_eq!(cli.bind, SocketAddr::from(([127, 0, 0, 1], 3000)));
        assert_eq!(cli.app_name, DEFAULT_APP_NAME);
    }

    #[test]
    fn cli__should_parse_init_subcommand() {
        // When
        let cli = Cli::try_parse_from(["alerttrail-push", "init", "--subject", "mailto:a@b.c"])
            .expect("parse cli");

        // Then
        match cli.command {
            Some(Command::Init(args)) => assert_eq!(args.subject.as_deref(), Some("mailto:a@b.c")),
            other => panic!("expected init command, got {other:?}"),
        }
    }

    #[test]
    fn resolve__should_reject_blank_app_name() {
        // Given
        let cli = Cli::try_parse_from(["alerttrail-push", "--app-name", "  "]).expect("parse cli");

        // When
        let outcome = resolve(cli);

        // Then
        assert!(matches!(outcome, RunOutcome::Exit(2)));
    }

    #[test]
    fn resolve__should_build_server_config() {
        // Given
        let cli = Cli::try_parse_from([
            "alerttrail-push",
            "--bind",
            "0.0.0.0:8080",
            "--vapid-public-key",
            "public",
        ])
        .expect("parse cli");

        // When
        let outcome = resolve(cli);

        // Then
        let RunOutcome::Serve(config) = outcome else {
            panic!("expected serve outcome");
        };
        assert_eq!(config.bind, SocketAddr::from(([0, 0, 0, 0], 8080)));
        assert_eq!(config.vapid_public_key.as_deref(), Some("public"));
        assert_eq!(
            config.dispatch.cooldown,
            Duration::from_secs(DEFAULT_COOLDOWN_MINUTES * 60)
        );
    }

    #[test]
    fn resolve__should_apply_dispatch_flags() {
        // Given
        let cli = Cli::try_parse_from([
            "alerttrail-push",
            "--cooldown-minutes",
            "0",
            "--quiet-hours",
            "22-7",
        ])
        .expect("parse cli");

        // When
        let outcome = resolve(cli);

        // Then
        let RunOutcome::Serve(config) = outcome else {
            panic!("expected serve outcome");
        };
        assert_eq!(config.dispatch.cooldown, Duration::ZERO);
        assert_eq!(
            config.dispatch.quiet_hours,
            Some(QuietHours { start: 22, end: 7 })
        );
    }

    #[test]
    fn cli__should_reject_malformed_quiet_hours() {
        // When
        let result = Cli::try_parse_from(["alerttrail-push", "--quiet-hours", "24-3"]);

        // Then
        assert!(result.is_err());
    }
}

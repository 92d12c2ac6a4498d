//! User-authored commands through the full pipeline

mod common;

use common::orchestrator;
use laia::command::model::CustomAction;
use laia::command::session::Session;
use laia::core::config::{LauncherMode, ResolverConfig};
use laia::core::types::{LocaleTag, Utterance};
use laia::pipeline::ResolutionOutcome;
use laia::rules::{parse_custom_commands, CustomCommandRule};

fn youtube() -> CustomCommandRule {
    CustomCommandRule {
        name: "youtube".into(),
        pattern: r"^posa (.+) a youtube$".into(),
        action: CustomAction::Search,
        action_data: "https://www.youtube.com/results?search_query=".into(),
        enabled: true,
    }
}

fn ca(text: &str) -> Utterance {
    Utterance::typed(text, LocaleTag::Ca)
}

#[tokio::test]
async fn test_custom_search_command() {
    let mut config = ResolverConfig::default();
    config.custom_commands.push(youtube());
    let (orch, sink) = orchestrator(config, None);
    let mut session = Session::new(LocaleTag::Ca);

    let outcome = orch
        .resolve(&ca("Posa els catarres a youtube"), &mut session)
        .await;

    assert_eq!(
        outcome,
        ResolutionOutcome::Executed {
            response: "Ordre executada: youtube".into()
        }
    );
    assert_eq!(
        sink.actions(),
        vec!["url:https://www.youtube.com/results?search_query=els+catarres".to_string()]
    );
}

#[tokio::test]
async fn test_hot_reload_replaces_commands() {
    let (orch, sink) = orchestrator(ResolverConfig::default(), None);
    let mut session = Session::new(LocaleTag::Ca);

    let before = orch.resolve(&ca("posa jazz a youtube"), &mut session).await;
    assert!(matches!(before, ResolutionOutcome::Deferred { .. }));

    let skipped = orch.set_custom_commands(&[youtube()]);
    assert!(skipped.is_empty());

    let after = orch.resolve(&ca("posa jazz a youtube"), &mut session).await;
    assert!(matches!(after, ResolutionOutcome::Executed { .. }));
    assert_eq!(sink.actions().len(), 1);
}

#[tokio::test]
async fn test_invalid_and_disabled_rules_skipped() {
    let broken = CustomCommandRule {
        name: "trencada".into(),
        pattern: "^(obre".into(),
        ..youtube()
    };
    let disabled = CustomCommandRule {
        name: "llum".into(),
        pattern: "^encén el llum$".into(),
        action: CustomAction::Custom,
        action_data: "shortcut://lights-on".into(),
        enabled: false,
    };

    let (orch, sink) = orchestrator(ResolverConfig::default(), None);
    let skipped = orch.set_custom_commands(&[broken, disabled, youtube()]);
    assert_eq!(skipped, vec!["trencada".to_string()]);

    let mut session = Session::new(LocaleTag::Ca);
    let outcome = orch.resolve(&ca("encén el llum"), &mut session).await;
    assert!(matches!(outcome, ResolutionOutcome::Deferred { .. }));

    let outcome = orch.resolve(&ca("posa jazz a youtube"), &mut session).await;
    assert!(matches!(outcome, ResolutionOutcome::Executed { .. }));
    assert_eq!(sink.actions().len(), 1);
}

#[tokio::test]
async fn test_enhanced_rules_shadow_custom_commands() {
    let mut config = ResolverConfig::default();
    config.custom_commands.push(CustomCommandRule {
        name: "notes".into(),
        pattern: "^apunta (.+)$".into(),
        action: CustomAction::OpenApp,
        action_data: "com.example.notes".into(),
        enabled: true,
    });
    let (orch, sink) = orchestrator(config, None);
    let mut session = Session::new(LocaleTag::Ca);

    orch.resolve(&ca("apunta compra llet"), &mut session).await;
    assert_eq!(sink.notes(), vec!["compra llet".to_string()]);
    assert!(!sink.actions().iter().any(|a| a.starts_with("app:")));
}

#[tokio::test]
async fn test_basic_mode_ignores_custom_commands() {
    let mut config = ResolverConfig::default();
    config.launcher_mode = LauncherMode::Basic;
    config.custom_commands.push(youtube());
    let (orch, sink) = orchestrator(config, None);
    let mut session = Session::new(LocaleTag::Ca);

    let outcome = orch.resolve(&ca("posa jazz a youtube"), &mut session).await;
    assert!(matches!(outcome, ResolutionOutcome::Deferred { .. }));
    assert!(sink.actions().is_empty());
}

#[test]
fn test_conflicts_reported_for_builtin_phrases() {
    let (orch, _) = orchestrator(ResolverConfig::default(), None);

    let conflicts = orch.find_conflicts("^apunta", LocaleTag::Ca).unwrap();
    assert!(conflicts.contains(&"apunta compra llet".to_string()));

    let conflicts = orch.find_conflicts("^posa .+ a youtube$", LocaleTag::Ca).unwrap();
    assert!(conflicts.is_empty());

    assert!(orch.find_conflicts("^(obre", LocaleTag::Ca).is_err());
}

#[tokio::test]
async fn test_commands_file_feeds_pipeline() {
    let rules = parse_custom_commands(
        r#"
[[custom_commands]]
name = "llum"
pattern = "^encén el llum$"
action = "custom"
action_data = "shortcut://lights-on"
"#,
    )
    .unwrap();

    let mut config = ResolverConfig::default();
    config.custom_commands = rules;
    let (orch, sink) = orchestrator(config, None);
    let mut session = Session::new(LocaleTag::Ca);

    let outcome = orch.resolve(&ca("Encén el llum"), &mut session).await;
    assert_eq!(
        outcome,
        ResolutionOutcome::Executed {
            response: "Ordre executada: llum".into()
        }
    );
    assert_eq!(sink.actions(), vec!["shortcut:shortcut://lights-on".to_string()]);
}

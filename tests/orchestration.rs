//! End-to-end orchestration behavior against a scripted provider.

mod support;

use parley::agent::{AgentRegistry, AgentSpec};
use parley::error::ApiError;
use parley::handoff::HandoffTable;
use parley::orchestrator::{HandoffOrchestrator, TerminationPolicy};
use parley::session::{ConversationEntry, ConversationSession, SessionStatus, Speaker, TerminationReason};
use std::sync::Arc;
use std::time::Duration;
use support::{fail, handoff, reply, ScriptedProvider, Step};

fn haiku_registry() -> AgentRegistry {
    let mut registry = AgentRegistry::new();
    registry.add("A", "You are helpful.").unwrap();
    registry.add("B", "Only speak in haikus.").unwrap();
    registry
}

fn participants(registry: &AgentRegistry, names: &[&str]) -> Vec<Arc<AgentSpec>> {
    let names: Vec<String> = names.iter().map(|n| n.to_string()).collect();
    registry.select(&names).unwrap()
}

fn speakers(session: &ConversationSession) -> Vec<String> {
    session
        .transcript()
        .iter()
        .map(|e| e.speaker.to_string())
        .collect()
}

#[tokio::test]
async fn two_turn_run_reaches_max_turns() {
    let registry = haiku_registry();
    let provider = Arc::new(ScriptedProvider::new(vec![
        reply("Hello! How can I help?"),
        reply("Greetings drift in / a quiet voice answers back / the chat has begun"),
    ]));
    let orchestrator = HandoffOrchestrator::new(provider.clone());

    let mut session = ConversationSession::new();
    session.start(participants(&registry, &["A", "B"]), 2, "Hi").unwrap();
    let summary = orchestrator.run(&mut session).await.unwrap();

    assert_eq!(summary.turns, 2);
    assert_eq!(summary.reason, TerminationReason::MaxTurnsReached);
    assert_eq!(
        session.status(),
        &SessionStatus::Terminated(TerminationReason::MaxTurnsReached)
    );
    assert_eq!(speakers(&session), vec!["user", "A", "B"]);
    assert_eq!(session.transcript()[0].content, "Hi");
    assert_eq!(session.transcript()[1].content, "Hello! How can I help?");
}

#[tokio::test]
async fn failure_on_second_turn_keeps_partial_transcript() {
    let registry = haiku_registry();
    let provider = Arc::new(ScriptedProvider::new(vec![
        reply("Hello!"),
        fail("connection reset"),
    ]));
    let orchestrator = HandoffOrchestrator::new(provider.clone());

    let mut session = ConversationSession::new();
    session.start(participants(&registry, &["A", "B"]), 2, "Hi").unwrap();
    let summary = orchestrator.run(&mut session).await.unwrap();

    assert_eq!(speakers(&session), vec!["user", "A"]);
    assert_eq!(summary.turns, 1);
    match session.status() {
        SessionStatus::Terminated(TerminationReason::ProviderError { message }) => {
            assert!(message.contains("connection reset"));
        }
        other => panic!("unexpected status {:?}", other),
    }
    // Never retried
    assert_eq!(provider.calls().len(), 2);
}

#[tokio::test]
async fn keyword_in_any_case_stops_the_run() {
    let registry = haiku_registry();
    let provider = Arc::new(ScriptedProvider::new(vec![
        reply("Hello there"),
        reply("Well then, GoodBye!"),
        reply("never sent"),
    ]));
    let orchestrator = HandoffOrchestrator::new(provider.clone());

    let mut session = ConversationSession::new();
    session.start(participants(&registry, &["A", "B"]), 5, "Hi").unwrap();
    let summary = orchestrator.run(&mut session).await.unwrap();

    assert_eq!(summary.reason, TerminationReason::KeywordDetected);
    assert_eq!(session.turn_count(), 2);
    assert_eq!(session.transcript().len(), 3);
    assert_eq!(provider.calls().len(), 2);
}

#[tokio::test]
async fn disabled_policy_ignores_keyword() {
    let registry = haiku_registry();
    let provider = Arc::new(ScriptedProvider::new(vec![reply("goodbye"), reply("goodbye")]));
    let orchestrator =
        HandoffOrchestrator::new(provider).with_policy(TerminationPolicy::Disabled);

    let mut session = ConversationSession::new();
    session.start(participants(&registry, &["A", "B"]), 2, "Hi").unwrap();
    let summary = orchestrator.run(&mut session).await.unwrap();

    assert_eq!(summary.reason, TerminationReason::MaxTurnsReached);
}

#[tokio::test]
async fn round_robin_alternates_two_speakers() {
    let registry = haiku_registry();
    let provider = Arc::new(ScriptedProvider::new(Vec::new()));
    let orchestrator = HandoffOrchestrator::new(provider);

    let mut session = ConversationSession::new();
    let picked = participants(&registry, &["A", "B"]);
    session.start(picked.clone(), 6, "Hi").unwrap();
    orchestrator.run(&mut session).await.unwrap();

    assert_eq!(session.transcript().len(), 7);
    for (k, entry) in session.transcript().iter().enumerate().skip(1) {
        assert_eq!(entry.speaker, Speaker::Agent(picked[(k - 1) % 2].name.clone()));
    }
}

#[tokio::test]
async fn provider_sees_whole_transcript_every_call() {
    let registry = haiku_registry();
    let provider = Arc::new(ScriptedProvider::new(Vec::new()));
    let orchestrator = HandoffOrchestrator::new(provider.clone());

    let mut session = ConversationSession::new();
    session.start(participants(&registry, &["A", "B"]), 3, "Hi").unwrap();
    orchestrator.run(&mut session).await.unwrap();

    let lens: Vec<usize> = provider.calls().iter().map(|c| c.transcript_len).collect();
    assert_eq!(lens, vec![1, 2, 3]);
}

#[tokio::test]
async fn handoff_jumps_to_nominated_participant() {
    let mut registry = AgentRegistry::new();
    registry
        .add_spec(AgentSpec::new("A", "Route requests.").with_handoff_action("transfer_to_c"))
        .unwrap();
    registry.add("B", "General help.").unwrap();
    registry.add("C", "Specialist.").unwrap();

    let provider = Arc::new(ScriptedProvider::new(vec![
        handoff("Passing you to C", "transfer_to_c"),
        reply("C here"),
        reply("A again"),
    ]));
    let orchestrator = HandoffOrchestrator::new(provider)
        .with_handoffs(HandoffTable::new().with_route("transfer_to_c", "C"));

    let mut session = ConversationSession::new();
    session
        .start(participants(&registry, &["A", "B", "C"]), 3, "I need a specialist")
        .unwrap();
    orchestrator.run(&mut session).await.unwrap();

    // A hands to C, then round-robin continues from C back to A
    assert_eq!(speakers(&session), vec!["user", "A", "C", "A"]);
}

#[tokio::test]
async fn handoff_to_non_participant_terminates() {
    let mut registry = AgentRegistry::new();
    registry
        .add_spec(AgentSpec::new("A", "Route.").with_handoff_action("transfer_to_z"))
        .unwrap();
    registry.add("B", "Help.").unwrap();

    let provider = Arc::new(ScriptedProvider::new(vec![handoff("Try Z", "transfer_to_z")]));
    let orchestrator = HandoffOrchestrator::new(provider)
        .with_handoffs(HandoffTable::new().with_route("transfer_to_z", "Z"));

    let mut session = ConversationSession::new();
    session.start(participants(&registry, &["A", "B"]), 4, "Hi").unwrap();
    let summary = orchestrator.run(&mut session).await.unwrap();

    assert_eq!(
        summary.reason,
        TerminationReason::HandoffTargetMissing {
            target: "Z".to_string()
        }
    );
    // The reply that carried the handoff is kept
    assert_eq!(speakers(&session), vec!["user", "A"]);
}

#[tokio::test]
async fn undeclared_capability_is_unresolvable() {
    let registry = haiku_registry();
    let provider = Arc::new(ScriptedProvider::new(vec![handoff("sneaky", "transfer_to_b")]));
    let orchestrator = HandoffOrchestrator::new(provider)
        .with_handoffs(HandoffTable::new().with_route("transfer_to_b", "B"));

    let mut session = ConversationSession::new();
    session.start(participants(&registry, &["A", "B"]), 4, "Hi").unwrap();
    let summary = orchestrator.run(&mut session).await.unwrap();

    assert_eq!(
        summary.reason,
        TerminationReason::HandoffTargetMissing {
            target: "transfer_to_b".to_string()
        }
    );
}

#[tokio::test]
async fn empty_response_is_a_provider_error() {
    let registry = haiku_registry();
    let provider = Arc::new(ScriptedProvider::new(vec![Step::Empty]));
    let orchestrator = HandoffOrchestrator::new(provider);

    let mut session = ConversationSession::new();
    session.start(participants(&registry, &["A", "B"]), 2, "Hi").unwrap();
    let summary = orchestrator.run(&mut session).await.unwrap();

    assert!(matches!(summary.reason, TerminationReason::ProviderError { .. }));
    assert_eq!(session.transcript().len(), 1);
}

#[tokio::test]
async fn slow_provider_hits_turn_timeout() {
    let registry = haiku_registry();
    let provider = Arc::new(ScriptedProvider::new(vec![
        reply("quick"),
        Step::Slow(Duration::from_secs(5), "too late".to_string()),
    ]));
    let orchestrator = HandoffOrchestrator::new(provider)
        .with_turn_timeout(Some(Duration::from_millis(20)));

    let mut session = ConversationSession::new();
    session.start(participants(&registry, &["A", "B"]), 3, "Hi").unwrap();
    let summary = orchestrator.run(&mut session).await.unwrap();

    assert!(matches!(summary.reason, TerminationReason::ProviderError { .. }));
    assert_eq!(speakers(&session), vec!["user", "A"]);
}

#[tokio::test]
async fn cancellation_stops_before_next_turn() {
    let registry = haiku_registry();
    let provider = Arc::new(ScriptedProvider::new(Vec::new()));
    let orchestrator = HandoffOrchestrator::new(provider.clone());
    let handle = orchestrator.cancellation_handle();

    let mut session = ConversationSession::new();
    session.start(participants(&registry, &["A", "B"]), 5, "Hi").unwrap();

    let mut seen = 0;
    let summary = orchestrator
        .run_with_observer(&mut session, |_: &ConversationEntry| {
            seen += 1;
            if seen == 2 {
                handle.cancel();
            }
        })
        .await
        .unwrap();

    assert_eq!(summary.reason, TerminationReason::Cancelled);
    assert_eq!(session.turn_count(), 2);
    assert_eq!(provider.calls().len(), 2);
}

#[tokio::test]
async fn cancelled_run_does_not_carry_into_the_next() {
    let registry = haiku_registry();
    let provider = Arc::new(ScriptedProvider::new(Vec::new()));
    let orchestrator = HandoffOrchestrator::new(provider);
    let handle = orchestrator.cancellation_handle();

    let mut session = ConversationSession::new();
    session.start(participants(&registry, &["A", "B"]), 5, "Hi").unwrap();
    let first = orchestrator
        .run_with_observer(&mut session, |_: &ConversationEntry| handle.cancel())
        .await
        .unwrap();
    assert_eq!(first.reason, TerminationReason::Cancelled);
    assert_eq!(first.turns, 1);

    session.start(participants(&registry, &["A", "B"]), 3, "Again").unwrap();
    let second = orchestrator.run(&mut session).await.unwrap();

    assert_eq!(second.reason, TerminationReason::MaxTurnsReached);
    assert_eq!(second.turns, 3);
    assert_eq!(session.transcript().len(), 4);
}

#[tokio::test]
async fn keyword_wins_over_handoff_in_the_same_reply() {
    let mut registry = AgentRegistry::new();
    registry
        .add_spec(AgentSpec::new("A", "Route.").with_handoff_action("transfer_to_z"))
        .unwrap();
    registry.add("B", "Help.").unwrap();

    let provider = Arc::new(ScriptedProvider::new(vec![handoff("ok goodbye", "transfer_to_z")]));
    let orchestrator = HandoffOrchestrator::new(provider)
        .with_handoffs(HandoffTable::new().with_route("transfer_to_z", "Z"));

    let mut session = ConversationSession::new();
    session.start(participants(&registry, &["A", "B"]), 4, "Hi").unwrap();
    let summary = orchestrator.run(&mut session).await.unwrap();

    assert_eq!(summary.reason, TerminationReason::KeywordDetected);
    assert_eq!(speakers(&session), vec!["user", "A"]);
}

#[tokio::test]
async fn run_requires_running_session() {
    let registry = haiku_registry();
    let orchestrator = HandoffOrchestrator::new(Arc::new(ScriptedProvider::new(Vec::new())));

    let mut idle = ConversationSession::new();
    assert!(matches!(
        orchestrator.run(&mut idle).await,
        Err(ApiError::SessionNotRunning(_))
    ));

    let mut session = ConversationSession::new();
    session.start(participants(&registry, &["A", "B"]), 1, "Hi").unwrap();
    orchestrator.run(&mut session).await.unwrap();

    // Terminated is absorbing until reset
    assert!(orchestrator.run(&mut session).await.is_err());
    assert_eq!(session.transcript().len(), 2);

    session.reset();
    assert!(session.transcript().is_empty());
    assert_eq!(session.status(), &SessionStatus::Idle);

    session.start(participants(&registry, &["A", "B"]), 1, "Again").unwrap();
    orchestrator.run(&mut session).await.unwrap();
    assert_eq!(session.transcript().len(), 2);
}

#[tokio::test]
async fn registry_edits_do_not_reach_a_started_session() {
    let mut registry = haiku_registry();
    let provider = Arc::new(ScriptedProvider::new(Vec::new()));
    let orchestrator = HandoffOrchestrator::new(provider.clone());

    let mut session = ConversationSession::new();
    session.start(participants(&registry, &["A", "B"]), 2, "Hi").unwrap();

    registry.update("A", "You are grumpy.").unwrap();
    registry.delete("B").unwrap();

    orchestrator.run(&mut session).await.unwrap();

    let calls = provider.calls();
    assert_eq!(calls[0].instructions, "You are helpful.");
    assert_eq!(calls[1].agent, "B");
    assert_eq!(calls[1].instructions, "Only speak in haikus.");
}

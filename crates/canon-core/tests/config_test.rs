use std::sync::Mutex;

use canon_core::config::*;
use canon_core::errors::ConfigError;

/// Global mutex to serialize tests that modify environment variables.
static ENV_MUTEX: Mutex<()> = Mutex::new(());

fn tempdir() -> tempfile::TempDir {
    tempfile::TempDir::new().unwrap()
}

/// Clear all CANON_ env vars to prevent cross-test contamination.
fn clear_canon_env_vars() {
    let keys: Vec<String> = std::env::vars()
        .map(|(k, _)| k)
        .filter(|k| k.starts_with("CANON_"))
        .collect();
    for key in keys {
        std::env::remove_var(key);
    }
}

fn field_of(err: ConfigError) -> String {
    match err {
        ConfigError::ValidationFailed { field, .. } => field,
        other => panic!("expected ValidationFailed, got {other:?}"),
    }
}

// ─── Defaults ──────────────────────────────────────────────────────────────

#[test]
fn config_loads_from_empty_toml_with_all_defaults() {
    let config = CanonConfig::from_toml("").unwrap();

    assert_eq!(config.llm.provider, ProviderKind::Anthropic);
    assert_eq!(config.llm.max_tokens, 1024);
    assert_eq!(config.llm.timeout_secs, 180);

    assert_eq!(config.retry.max_attempts, 5);
    assert_eq!(config.retry.base_delay_ms, 1_000);
    assert_eq!(config.retry.max_delay_ms, 60_000);
    assert_eq!(config.retry.jitter_fraction, 0.25);

    assert_eq!(config.throttle.inter_call_pause_ms, 500);
    assert_eq!(config.throttle.inter_claim_pause_ms, 1_000);

    assert_eq!(config.reasoning.profile, ThresholdProfile::Conservative);
    assert_eq!(config.reasoning.max_passages, 5);
    assert_eq!(config.reasoning.passage_char_limit, 1_500);
    assert_eq!(config.reasoning.max_excerpts, 5);
    assert!(!config.reasoning.evaluate_sub_claims);

    assert_eq!(config.retrieval.top_k_per_slice, 3);
    assert_eq!(config.batch.max_concurrent_claims, 1);
    assert_eq!(config.batch.bias_warning_fraction, 0.8);
    assert_eq!(config.observability.log_level, "info");

    assert!(config.validate().is_ok());
}

#[test]
fn default_thresholds_are_conservative() {
    let t = CanonConfig::default().reasoning.resolved_thresholds();
    assert_eq!(t.contradiction_threshold, 0.4);
    assert_eq!(t.strong_support_threshold, 0.7);
    assert_eq!(t.weak_contradiction_threshold, 0.25);
    assert_eq!(t.contradiction_bonus, 0.1);
    assert_eq!(t.confidence_cap, 0.95);
    assert_eq!(t.support_penalty, 0.9);
    assert_eq!(t.undetermined_floor, 0.3);
    assert_eq!(t.undetermined_cap, 0.5);
    assert!(t.is_conservative());
}

#[test]
fn provider_defaults_resolve_per_kind() {
    let mut llm = LlmConfig::default();
    assert_eq!(llm.resolved_base_url(), "https://api.anthropic.com");
    llm.provider = ProviderKind::Ollama;
    assert_eq!(llm.resolved_base_url(), "http://localhost:11434");
    llm.base_url = "http://gpu-box:11434/".into();
    assert_eq!(llm.resolved_base_url(), "http://gpu-box:11434");
    llm.model = "llama3".into();
    assert_eq!(llm.resolved_model(), "llama3");
}

// ─── TOML ──────────────────────────────────────────────────────────────────

#[test]
fn config_loads_partial_toml_with_overrides() {
    let toml = r#"
[llm]
provider = "ollama"
model = "mistral"

[reasoning]
profile = "boosted"
evaluate_sub_claims = true
"#;
    let config = CanonConfig::from_toml(toml).unwrap();
    assert_eq!(config.llm.provider, ProviderKind::Ollama);
    assert_eq!(config.llm.model, "mistral");
    assert_eq!(config.llm.max_tokens, 1024);
    assert!(config.reasoning.evaluate_sub_claims);
    let t = config.reasoning.resolved_thresholds();
    assert_eq!(t, SynthesisThresholds::boosted());
    assert!(!t.is_conservative());
}

#[test]
fn partial_threshold_override_keeps_conservative_rest() {
    let toml = r#"
[reasoning.thresholds]
weak_contradiction_threshold = 0.2
"#;
    let config = CanonConfig::from_toml(toml).unwrap();
    let t = config.reasoning.resolved_thresholds();
    assert_eq!(t.weak_contradiction_threshold, 0.2);
    assert_eq!(t.contradiction_threshold, 0.4);
    assert!(config.validate().is_ok());
}

#[test]
fn invalid_toml_is_parse_error() {
    let err = CanonConfig::from_toml("[llm\nprovider = 1").unwrap_err();
    assert!(matches!(err, ConfigError::ParseError { .. }));
}

#[test]
fn config_round_trips_through_toml() {
    let mut config = CanonConfig::default();
    config.batch.output_dir = "out".into();
    config.reasoning.thresholds = Some(SynthesisThresholds::conservative());
    let text = config.to_toml().unwrap();
    let back = CanonConfig::from_toml(&text).unwrap();
    assert_eq!(back.batch.output_dir, "out");
    assert_eq!(back.reasoning.thresholds, Some(SynthesisThresholds::conservative()));
}

// ─── Validation ────────────────────────────────────────────────────────────

#[test]
fn boosted_profile_passes_validation() {
    assert!(SynthesisThresholds::boosted().validate().is_ok());
}

#[test]
fn contradiction_threshold_must_be_below_strong_support() {
    let t = SynthesisThresholds {
        contradiction_threshold: 0.6,
        strong_support_threshold: 0.6,
        ..SynthesisThresholds::conservative()
    };
    assert_eq!(
        field_of(t.validate().unwrap_err()),
        "reasoning.thresholds.contradiction_threshold"
    );
}

#[test]
fn weak_contradiction_must_be_below_contradiction() {
    let t = SynthesisThresholds {
        weak_contradiction_threshold: 0.45,
        ..SynthesisThresholds::conservative()
    };
    assert_eq!(
        field_of(t.validate().unwrap_err()),
        "reasoning.thresholds.weak_contradiction_threshold"
    );
}

#[test]
fn contradiction_threshold_cannot_exceed_definite_floor() {
    let t = SynthesisThresholds {
        contradiction_threshold: 0.65,
        strong_support_threshold: 0.8,
        ..SynthesisThresholds::conservative()
    };
    assert!(t.validate().is_err());
}

#[test]
fn validation_rejects_zero_concurrency() {
    let mut config = CanonConfig::default();
    config.batch.max_concurrent_claims = 0;
    assert_eq!(
        field_of(config.validate().unwrap_err()),
        "batch.max_concurrent_claims"
    );
}

#[test]
fn validation_rejects_inverted_retry_delays() {
    let mut config = CanonConfig::default();
    config.retry.base_delay_ms = 120_000;
    assert_eq!(field_of(config.validate().unwrap_err()), "retry.base_delay_ms");
}

// ─── Layered resolution ────────────────────────────────────────────────────

#[test]
fn load_without_project_file_uses_defaults() {
    let _guard = ENV_MUTEX.lock().unwrap_or_else(|e| e.into_inner());
    clear_canon_env_vars();
    let dir = tempdir();
    let config = CanonConfig::load(dir.path(), None).unwrap();
    assert_eq!(config.batch.output_dir, "results");
}

#[test]
fn layers_resolve_cli_over_env_over_project() {
    let _guard = ENV_MUTEX.lock().unwrap_or_else(|e| e.into_inner());
    clear_canon_env_vars();
    let dir = tempdir();
    std::fs::write(
        dir.path().join("canon.toml"),
        "[batch]\noutput_dir = \"from-file\"\nmax_concurrent_claims = 2\n",
    )
    .unwrap();

    let config = CanonConfig::load(dir.path(), None).unwrap();
    assert_eq!(config.batch.output_dir, "from-file");
    assert_eq!(config.batch.max_concurrent_claims, 2);

    std::env::set_var("CANON_BATCH_OUTPUT_DIR", "from-env");
    std::env::set_var("CANON_BATCH_MAX_CONCURRENT_CLAIMS", "3");
    let config = CanonConfig::load(dir.path(), None).unwrap();
    assert_eq!(config.batch.output_dir, "from-env");
    assert_eq!(config.batch.max_concurrent_claims, 3);

    let cli = CliOverrides {
        max_concurrent_claims: Some(4),
        ..Default::default()
    };
    let config = CanonConfig::load(dir.path(), Some(&cli)).unwrap();
    assert_eq!(config.batch.output_dir, "from-env");
    assert_eq!(config.batch.max_concurrent_claims, 4);

    clear_canon_env_vars();
}

#[test]
fn unparseable_env_values_are_ignored() {
    let _guard = ENV_MUTEX.lock().unwrap_or_else(|e| e.into_inner());
    clear_canon_env_vars();
    std::env::set_var("CANON_RETRY_MAX_ATTEMPTS", "many");
    std::env::set_var("CANON_LLM_PROVIDER", "mainframe");
    let dir = tempdir();
    let config = CanonConfig::load(dir.path(), None).unwrap();
    assert_eq!(config.retry.max_attempts, 5);
    assert_eq!(config.llm.provider, ProviderKind::Anthropic);
    clear_canon_env_vars();
}

#[test]
fn load_rejects_invalid_project_file() {
    let _guard = ENV_MUTEX.lock().unwrap_or_else(|e| e.into_inner());
    clear_canon_env_vars();
    let dir = tempdir();
    std::fs::write(
        dir.path().join("canon.toml"),
        "[reasoning.thresholds]\ncontradiction_threshold = 0.8\nstrong_support_threshold = 0.9\n",
    )
    .unwrap();
    let err = CanonConfig::load(dir.path(), None).unwrap_err();
    assert!(matches!(err, ConfigError::ValidationFailed { .. }));
}

#[test]
fn explicit_file_replaces_project_file() {
    let _guard = ENV_MUTEX.lock().unwrap_or_else(|e| e.into_inner());
    clear_canon_env_vars();
    let dir = tempdir();
    let path = dir.path().join("alt.toml");
    std::fs::write(&path, "[reasoning]\nprofile = \"boosted\"\n").unwrap();

    let cli = CliOverrides {
        output_dir: Some("cli-out".into()),
        ..Default::default()
    };
    let config = CanonConfig::load_file(&path, Some(&cli)).unwrap();
    assert_eq!(config.reasoning.profile, ThresholdProfile::Boosted);
    assert_eq!(config.batch.output_dir, "cli-out");

    let missing = CanonConfig::load_file(&dir.path().join("absent.toml"), None).unwrap_err();
    assert!(matches!(missing, ConfigError::FileNotFound { .. }));
}

use engram_domain::utils::{clip, dedupe_preserve_order, stable_hash};

#[test]
fn test_clip_keeps_short_text() {
    assert_eq!(clip("hello", 10), "hello");
}

#[test]
fn test_clip_appends_ellipsis() {
    let out = clip("abcdefghij", 8);
    assert_eq!(out, "abcde...");
    assert_eq!(out.chars().count(), 8);
}

#[test]
fn test_clip_respects_multibyte_boundaries() {
    let out = clip("供應鏈管理系統概述", 6);
    assert!(out.ends_with("..."));
    assert_eq!(out.chars().count(), 6);
}

#[test]
fn test_clip_zero_is_empty() {
    assert_eq!(clip("anything", 0), "");
}

#[test]
fn test_dedupe_preserves_first_seen_order() {
    let out = dedupe_preserve_order(["b", "a", "b", "", "  ", "a", "c"]);
    assert_eq!(out, vec!["b", "a", "c"]);
}

#[test]
fn test_stable_hash_is_deterministic() {
    assert_eq!(stable_hash("query:ctx"), stable_hash("query:ctx"));
    assert_ne!(stable_hash("query:ctx"), stable_hash("query:ctx2"));
}

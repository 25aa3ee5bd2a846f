use engram_domain::ports::NerProvider;
use engram_providers::ner::LexicalNerProvider;

#[tokio::test]
async fn test_part_numbers_are_labelled() {
    let ner = LexicalNerProvider::new();
    let entities = ner
        .extract_entities("RM05-008 上月買進多少")
        .await
        .expect("extract");
    let part = entities
        .iter()
        .find(|e| e.label.as_deref() == Some("part_number"))
        .expect("part number entity");
    assert_eq!(part.text, "RM05-008");
}

#[tokio::test]
async fn test_cjk_runs_are_extracted() {
    let ner = LexicalNerProvider::new();
    let entities = ner.extract_entities("供應鏈管理 與 物流").await.expect("extract");
    let texts: Vec<&str> = entities.iter().map(|e| e.text.as_str()).collect();
    assert!(texts.contains(&"供應鏈管理"));
    assert!(texts.contains(&"物流"));
}

#[tokio::test]
async fn test_duplicates_are_collapsed() {
    let ner = LexicalNerProvider::new();
    let entities = ner
        .extract_entities("ABC-123 和 ABC-123")
        .await
        .expect("extract");
    let count = entities.iter().filter(|e| e.text == "ABC-123").count();
    assert_eq!(count, 1);
}

#[tokio::test]
async fn test_plain_text_yields_nothing_interesting() {
    let ner = LexicalNerProvider::new();
    let entities = ner.extract_entities("nothing here").await.expect("extract");
    assert!(entities.is_empty());
}

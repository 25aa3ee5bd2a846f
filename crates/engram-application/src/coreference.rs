//! Coreference and ellipsis resolution.
//!
//! Three-stage pipeline over a user query: long-term-memory-assisted
//! substitution, rule-based substitution, then a language-model fallback
//! with a strict-JSON prompt. Every accepted resolution writes its typed
//! entities back into long-term memory.

use std::collections::HashMap;
use std::sync::Arc;

use engram_domain::constants::search::{
    COREF_AAM_ACCEPT, COREF_MIN_CONFIDENCE, COREF_MODEL_CONFIDENCE, COREF_RULE_ACCEPT,
    COREF_RULE_CAP, COREF_WRITEBACK_MIN_CONFIDENCE,
};
use engram_domain::entities::{
    ChatTurn, MemoryPriority, MemoryRecord, MemoryStatus, MemoryTier, ResolutionMethod,
    ResolutionResult,
};
use engram_domain::ports::{ChatModelProvider, VectorMemoryAdapter};
use engram_domain::utils::{id, time};
use once_cell::sync::Lazy;
use regex::Regex;

/// Entity type for part-number memories
pub const ENTITY_PART_NUMBER: &str = "part_number";
/// Entity type for transaction-code memories
pub const ENTITY_TLF19: &str = "tlf19";

const NEAR_PRONOUNS: &[&str] = &["這個", "這", "此"];
const FAR_PRONOUNS: &[&str] = &["那個", "那"];
const PERSON_PRONOUNS: &[&str] = &["他", "她", "它"];

const ACTION_WORDS: &[&str] = &["庫存", "存貨", "採購", "買", "賣", "領料", "報廢"];

static PART_TOKEN: Lazy<Regex> = Lazy::new(|| {
    #[allow(clippy::unwrap_used)]
    Regex::new(r"RM05|ABC-|10-|料號").unwrap()
});

/// Domain vocabulary grouped by intent; presence of any word marks the
/// query as action-bearing.
static DOMAIN_VOCAB: Lazy<Vec<&'static str>> = Lazy::new(|| {
    vec![
        "料號", "品號", "型號", "編號", "庫存", "存量", "剩餘", "結存", "還有多少", "總共有多少",
        "存貨", "採購", "買", "買進", "進貨", "收料", "銷售", "賣", "賣出", "出貨", "出庫",
        "領料", "領用", "生產領料", "報廢", "報損", "損耗", "上月", "上個月", "最近", "今年",
        "去年", "本週", "本季",
    ]
});

/// Rule + memory + model coreference resolver.
pub struct CoreferenceResolver {
    vector_adapter: Option<Arc<dyn VectorMemoryAdapter>>,
    model: Option<Arc<dyn ChatModelProvider>>,
    model_name: String,
    history_turns: usize,
}

impl CoreferenceResolver {
    /// Build a resolver. Either collaborator may be absent; the pipeline
    /// degrades to the rule stage alone.
    #[must_use]
    pub fn new(
        vector_adapter: Option<Arc<dyn VectorMemoryAdapter>>,
        model: Option<Arc<dyn ChatModelProvider>>,
        model_name: impl Into<String>,
    ) -> Self {
        Self {
            vector_adapter,
            model,
            model_name: model_name.into(),
            history_turns: 3,
        }
    }

    /// Resolve pronouns and ellipses in `query` for `user_id`.
    pub async fn resolve(
        &self,
        query: &str,
        context_entities: &HashMap<String, String>,
        history: &[ChatTurn],
        user_id: &str,
    ) -> ResolutionResult {
        if !Self::needs_resolution(query) {
            return ResolutionResult::unresolved(query);
        }

        // Stage 0.5: consult long-term memory for this user's entities.
        let aam_entities = self.query_memory_entities(user_id, query).await;
        let mut merged = context_entities.clone();
        merged.extend(aam_entities.clone());

        // Stage 1: memory-assisted resolution, highest priority.
        if !aam_entities.is_empty() {
            let result = Self::resolve_with_entities(query, &aam_entities, ResolutionMethod::Aam);
            if result.resolved && result.confidence >= COREF_AAM_ACCEPT {
                self.store_resolution(user_id, &result).await;
                tracing::info!(resolved_query = %result.resolved_query, "Memory-assisted resolution accepted");
                return result;
            }
        }

        // Stage 2: rule-based resolution.
        let rule_result = Self::resolve_with_entities(query, &merged, ResolutionMethod::Rule);
        if rule_result.resolved && rule_result.confidence >= COREF_RULE_ACCEPT {
            self.store_resolution(user_id, &rule_result).await;
            tracing::info!(resolved_query = %rule_result.resolved_query, "Rule-based resolution accepted");
            return rule_result;
        }

        // Stage 3: model fallback.
        if let Some(model) = &self.model {
            if model.is_available().await {
                let llm_result = self
                    .resolve_with_model(&**model, query, &merged, history)
                    .await
                    .unwrap_or_else(|| rule_result.clone());
                self.store_resolution(user_id, &llm_result).await;
                return llm_result;
            }
        }

        // Stage 4: model unreachable; return the rule result even when weak.
        tracing::info!(resolved_query = %rule_result.resolved_query, "Model unavailable, using rule-based resolution");
        self.store_resolution(user_id, &rule_result).await;
        rule_result
    }

    /// True when the query carries a pronoun, or an action word without a
    /// part-number-like token.
    #[must_use]
    pub fn needs_resolution(query: &str) -> bool {
        let pronoun = NEAR_PRONOUNS
            .iter()
            .chain(FAR_PRONOUNS)
            .chain(PERSON_PRONOUNS)
            .any(|p| query.contains(p));
        if pronoun {
            return true;
        }
        let has_action = DOMAIN_VOCAB.iter().any(|w| query.contains(w));
        let has_part = PART_TOKEN.is_match(query);
        has_action && !has_part
    }

    async fn query_memory_entities(&self, user_id: &str, query: &str) -> HashMap<String, String> {
        let Some(adapter) = &self.vector_adapter else {
            return HashMap::new();
        };
        if user_id.is_empty() {
            return HashMap::new();
        }

        let mut entities = HashMap::new();
        for entity_type in [ENTITY_PART_NUMBER, ENTITY_TLF19] {
            let memories = adapter
                .search_entities(
                    query,
                    user_id,
                    Some(entity_type),
                    Some(MemoryStatus::Active),
                    COREF_MIN_CONFIDENCE,
                    3,
                )
                .await;
            if let Some(best) = memories.iter().max_by(|a, b| {
                a.confidence
                    .partial_cmp(&b.confidence)
                    .unwrap_or(std::cmp::Ordering::Equal)
            }) {
                entities.insert(entity_type.to_owned(), best.entity_value.clone());
                adapter.update_access(&best.memory_id).await;
            }
        }
        if !entities.is_empty() {
            tracing::info!(?entities, "Long-term memory supplied context entities");
        }
        entities
    }

    /// Pronoun substitution and ellipsis completion against a set of known
    /// entities. A successful substitution or completion carries the bulk
    /// of the score; the cap is 0.9 on the rule path and 0.95 on the
    /// memory-assisted path.
    fn resolve_with_entities(
        query: &str,
        entities: &HashMap<String, String>,
        method: ResolutionMethod,
    ) -> ResolutionResult {
        let mut resolved_query = query.to_owned();
        let mut resolved_entities: HashMap<String, String> = HashMap::new();
        let mut confidence = 0.0_f32;

        let (substitution_bonus, cap) = if method == ResolutionMethod::Aam {
            (COREF_AAM_ACCEPT, COREF_MODEL_CONFIDENCE)
        } else {
            (COREF_RULE_ACCEPT, COREF_RULE_CAP)
        };

        let part_number = entities.get(ENTITY_PART_NUMBER);
        let tlf19 = entities.get(ENTITY_TLF19);

        if let Some(part) = part_number {
            // Pronoun + classifier compounds first ("這個料號" names the
            // part as a unit), then bare pronouns.
            let mut substituted = false;
            for pronoun in NEAR_PRONOUNS.iter().chain(FAR_PRONOUNS) {
                let compound = format!("{pronoun}料號");
                if resolved_query.contains(&compound) {
                    resolved_query = resolved_query.replace(&compound, part);
                    substituted = true;
                    break;
                }
            }
            if !substituted {
                for pronouns in [NEAR_PRONOUNS, FAR_PRONOUNS, PERSON_PRONOUNS] {
                    if let Some(pronoun) = pronouns.iter().find(|p| resolved_query.contains(**p)) {
                        resolved_query = resolved_query.replace(pronoun, part);
                        substituted = true;
                        break;
                    }
                }
            }
            if substituted {
                resolved_entities.insert(ENTITY_PART_NUMBER.to_owned(), part.clone());
                confidence += substitution_bonus;
            }
        }

        // Ellipsis: an action without any part token gets the context part
        // number prefixed.
        let has_action = ACTION_WORDS.iter().any(|w| resolved_query.contains(w));
        let has_part = PART_TOKEN.is_match(&resolved_query);
        if has_action && !has_part {
            if let Some(part) = part_number {
                resolved_query = format!("{part} {resolved_query}");
                resolved_entities.insert(ENTITY_PART_NUMBER.to_owned(), part.clone());
                confidence += substitution_bonus;
            }
        }

        if let Some(tlf19) = tlf19 {
            resolved_entities.insert(ENTITY_TLF19.to_owned(), tlf19.clone());
            confidence += 0.1;
        }
        if method == ResolutionMethod::Rule {
            if let Some(intent) = entities.get("intent") {
                resolved_entities.insert("intent".to_owned(), intent.clone());
            }
        }

        confidence = confidence.min(cap);

        ResolutionResult {
            resolved: !resolved_entities.is_empty(),
            resolved_query,
            entities: resolved_entities,
            method,
            confidence,
        }
    }

    async fn resolve_with_model(
        &self,
        model: &dyn ChatModelProvider,
        query: &str,
        entities: &HashMap<String, String>,
        history: &[ChatTurn],
    ) -> Option<ResolutionResult> {
        let prompt = Self::build_prompt(query, entities, history, self.history_turns);
        let messages = vec![ChatTurn {
            role: "user".to_owned(),
            content: prompt,
        }];
        let output = match model.chat(&messages, &self.model_name).await {
            Ok(output) => output,
            Err(e) => {
                tracing::error!(error = %e, "Model resolution failed");
                return None;
            }
        };

        let parsed = Self::parse_model_output(&output)?;
        let resolved = parsed
            .get("resolved")
            .and_then(serde_json::Value::as_bool)
            .unwrap_or(false);
        let resolved_query = parsed
            .get("resolved_query")
            .and_then(|v| v.as_str())
            .unwrap_or(query)
            .to_owned();
        let mut result_entities = HashMap::new();
        if let Some(map) = parsed.get("entities").and_then(|v| v.as_object()) {
            for (k, v) in map {
                if let Some(s) = v.as_str() {
                    if !s.is_empty() {
                        result_entities.insert(k.clone(), s.to_owned());
                    }
                }
            }
        }

        tracing::info!(resolved_query = %resolved_query, "Model resolution succeeded");
        Some(ResolutionResult {
            resolved,
            resolved_query,
            entities: result_entities,
            method: ResolutionMethod::Llm,
            confidence: COREF_MODEL_CONFIDENCE,
        })
    }

    fn build_prompt(
        query: &str,
        entities: &HashMap<String, String>,
        history: &[ChatTurn],
        history_turns: usize,
    ) -> String {
        let mut context_lines = Vec::new();
        if let Some(part) = entities.get(ENTITY_PART_NUMBER) {
            context_lines.push(format!("料號: {part}"));
        }
        if let Some(tlf19) = entities.get(ENTITY_TLF19) {
            context_lines.push(format!("動作代碼: {tlf19}"));
        }
        if let Some(intent) = entities.get("intent") {
            context_lines.push(format!("上次意圖: {intent}"));
        }
        let context_str = if context_lines.is_empty() {
            "無".to_owned()
        } else {
            context_lines.join("\n")
        };

        let history_str = if history.is_empty() {
            "無對話歷史".to_owned()
        } else {
            history
                .iter()
                .rev()
                .take(history_turns)
                .rev()
                .map(|turn| {
                    let who = if turn.role == "user" { "用戶" } else { "助手" };
                    format!("{who}: {}", turn.content)
                })
                .collect::<Vec<_>>()
                .join("\n")
        };

        format!(
            "你是一個專業的中文指代消解助手，專注於物料管理領域。\n\n\
             【上下文信息】\n{context_str}\n\n\
             【對話歷史】\n{history_str}\n\n\
             【當前查詢】\n{query}\n\n\
             【任務】\n\
             1. 識別當前查詢中的指代詞（這個、那個、它、這、那）和省略信息\n\
             2. 從上下文中提取相關實體並填充到查詢中\n\
             3. 生成消解後的完整查詢\n\n\
             【輸出格式】（嚴格按照 JSON 格式輸出，不要有多餘文字）:\n\
             {{\"resolved\": true, \"resolved_query\": \"消解後的查詢\", \
             \"entities\": {{\"part_number\": \"料號（如果有）\", \"tlf19\": \"動作代碼（如果有）\"}}}}\n\n\
             現在請輸出 JSON:"
        )
    }

    fn parse_model_output(output: &str) -> Option<serde_json::Value> {
        let start = output.find('{')?;
        let end = output.rfind('}')?;
        if end <= start {
            return None;
        }
        match serde_json::from_str(&output[start..=end]) {
            Ok(value) => Some(value),
            Err(e) => {
                tracing::error!(error = %e, "Failed to parse model output");
                None
            }
        }
    }

    /// Persist resolved entities into long-term memory, updating confidence
    /// on exact duplicates. Persisting is gated on resolution confidence so
    /// fabricated low-confidence values stay out of memory.
    async fn store_resolution(&self, user_id: &str, result: &ResolutionResult) {
        let Some(adapter) = &self.vector_adapter else {
            return;
        };
        if user_id.is_empty()
            || !result.resolved
            || result.confidence < COREF_WRITEBACK_MIN_CONFIDENCE
        {
            return;
        }

        for (entity_type, key_prefix, priority, label) in [
            (ENTITY_PART_NUMBER, "part", MemoryPriority::High, "料號"),
            (ENTITY_TLF19, "tlf19", MemoryPriority::Medium, "動作代碼"),
        ] {
            let Some(value) = result.entities.get(entity_type) else {
                continue;
            };
            match adapter
                .find_by_exact_match(user_id, entity_type, value)
                .await
            {
                Some(mut existing) => {
                    existing.confidence = result.confidence;
                    existing.content = format!("{label}: {value}");
                    adapter.update(&existing).await;
                }
                None => {
                    let memory_id =
                        id::entity_memory_id(key_prefix, user_id, value, time::epoch_secs());
                    let record = MemoryRecord::with_id(
                        memory_id,
                        format!("{label}: {value}"),
                        MemoryTier::LongTerm,
                    )
                    .with_priority(priority)
                    .with_user(user_id)
                    .with_entity(entity_type, value.clone(), result.confidence);
                    adapter.store(&record).await;
                }
            }
        }
        tracing::debug!(user_id, entities = ?result.entities, "Stored resolution to long-term memory");
    }
}

//! Prompt assembly for the generation steps
//!
//! All traveler-facing text is Japanese and asks the model for markdown.

use crate::workflow::state::{PlanningState, SOURCE_ENCYCLOPEDIA, SOURCE_WEB_SEARCH};

/// System prompt for itinerary generation
pub const PLAN_SYSTEM_PROMPT: &str = "あなたは日本の旅行プランを提案する専門家です。
提供された情報に基づいて、最適な旅行プランを3つ提案してください。
各プランには以下の情報を含めてください：
- プランの概要と特徴
- 訪問する場所のリスト（各場所の簡単な説明を含む）
- おすすめの宿泊施設
- 食事のおすすめ
- 予想される費用の内訳
- 季節に合わせたアドバイス

回答は日本語でマークダウン形式にしてください。";

/// System prompt for the follow-up advice step
pub const RECOMMENDATION_SYSTEM_PROMPT: &str = "あなたは日本旅行のエキスパートです。
旅行プランに加えて、追加のアドバイスや現地の最新情報、文化的なヒントなどを提供してください。
回答は日本語でマークダウン形式にしてください。";

/// Build the itinerary request from the trip conditions, research text, and
/// knowledge-base hits
pub fn plan_user_message(state: &PlanningState) -> String {
    let request = &state.trip_request;

    let encyclopedia = state
        .research_results
        .get(SOURCE_ENCYCLOPEDIA)
        .map(String::as_str)
        .filter(|text| !text.trim().is_empty())
        .unwrap_or("情報なし");

    let mut message = format!(
        "以下の条件と収集した情報に基づいて旅行プランを作成してください。

現在地: {}
目的地: {}
予算: {}
滞在期間: {}
旅行の目的: {}

収集した情報:
{}",
        request.origin,
        request.destination,
        request.budget,
        request.duration,
        request.purpose,
        encyclopedia
    );

    if let Some(web) = state.research_results.get(SOURCE_WEB_SEARCH) {
        if !web.trim().is_empty() {
            message.push_str("\n\n");
            message.push_str(web);
        }
    }

    message.push_str("\n\nナレッジベースからの参考情報:\n");
    if state.retrieval_results.is_empty() {
        message.push_str("参考情報なし");
    } else {
        let references: Vec<String> = state
            .retrieval_results
            .iter()
            .map(|hit| {
                if hit.source.is_empty() {
                    hit.content.clone()
                } else {
                    format!("{}（出典: {}）", hit.content, hit.source)
                }
            })
            .collect();
        message.push_str(&references.join("\n\n"));
    }

    message
}

/// Build the advice request from the trip conditions
pub fn recommendation_user_message(state: &PlanningState) -> String {
    let request = &state.trip_request;
    format!(
        "以下の旅行条件について、追加のアドバイスや現地の最新情報、文化的なヒントなどを提供してください：

目的地: {}
滞在期間: {}
旅行の目的: {}
予算: {}

特に以下の点について触れてください：
- 現地の気候と服装のアドバイス
- 現地の交通手段
- 現地のマナーや慣習
- おすすめのお土産
- 旅行保険や安全に関するアドバイス",
        request.destination, request.duration, request.purpose, request.budget
    )
}

/// Render the degraded itinerary produced by the error handler
///
/// Needs nothing beyond the trip request, so it cannot itself fail.
pub fn fallback_plan(state: &PlanningState) -> String {
    let request = &state.trip_request;
    let error_message = if state.error.is_empty() {
        "不明なエラーが発生しました"
    } else {
        state.error.as_str()
    };

    format!(
        "# 旅行プラン生成中にエラーが発生しました

申し訳ありませんが、以下のエラーにより完全な旅行プランを生成できませんでした：

```
{}
```

### 基本的な{}旅行情報

* 滞在期間: {}
* 予算: {}
* 目的: {}

一般的な{}旅行のアドバイス：

1. 事前に主要な観光スポットを調査してください
2. 現地の天気に適した服装を準備してください
3. 現地の交通手段を確認してください
4. 旅行保険への加入を検討してください",
        error_message,
        request.destination,
        request.duration,
        request.budget,
        request.purpose,
        request.destination
    )
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use knowledgestore::RetrievalHit;

    use super::*;
    use crate::domain::{BudgetBand, DurationBand, TripRequest};

    fn state() -> PlanningState {
        PlanningState::new(TripRequest {
            origin: "大阪".to_string(),
            destination: "金沢".to_string(),
            budget: BudgetBand::Between100kAnd150k,
            duration: DurationBand::OneNight,
            purpose: "グルメ, 温泉".to_string(),
        })
    }

    #[test]
    fn test_plan_message_lists_trip_conditions() {
        let message = plan_user_message(&state());

        assert!(message.contains("現在地: 大阪"));
        assert!(message.contains("目的地: 金沢"));
        assert!(message.contains("予算: 10万円~15万円"));
        assert!(message.contains("滞在期間: 1泊2日"));
        assert!(message.contains("旅行の目的: グルメ, 温泉"));
    }

    #[test]
    fn test_plan_message_defaults_when_nothing_collected() {
        let message = plan_user_message(&state());

        assert!(message.contains("収集した情報:\n情報なし"));
        assert!(message.contains("ナレッジベースからの参考情報:\n参考情報なし"));
    }

    #[test]
    fn test_plan_message_includes_research_text() {
        let mut results = HashMap::new();
        results.insert(
            "encyclopedia".to_string(),
            "## 金沢市\n加賀百万石の城下町。".to_string(),
        );
        results.insert("web_search".to_string(), "兼六園が人気です。".to_string());

        let message = plan_user_message(&state().with_research_results(results));

        assert!(message.contains("収集した情報:\n## 金沢市\n加賀百万石の城下町。"));
        assert!(message.contains("兼六園が人気です。"));
        assert!(!message.contains("情報なし"));
    }

    #[test]
    fn test_plan_message_cites_retrieval_sources() {
        let hits = vec![
            RetrievalHit {
                content: "近江町市場は海鮮が名物です。".to_string(),
                source: "kanazawa.md".to_string(),
                similarity_score: 0.92,
            },
            RetrievalHit {
                content: "ナレッジベースが初期化されていません".to_string(),
                source: String::new(),
                similarity_score: 0.0,
            },
        ];

        let message = plan_user_message(&state().with_retrieval_hits(hits));

        assert!(message.contains("近江町市場は海鮮が名物です。（出典: kanazawa.md）"));
        // hits without a source are quoted bare
        assert!(message.contains("\n\nナレッジベースが初期化されていません"));
        assert!(!message.contains("（出典: ）"));
    }

    #[test]
    fn test_recommendation_message_lists_requested_angles() {
        let message = recommendation_user_message(&state());

        assert!(message.contains("目的地: 金沢"));
        assert!(message.contains("滞在期間: 1泊2日"));
        assert!(message.contains("- 現地の気候と服装のアドバイス"));
        assert!(message.contains("- おすすめのお土産"));
        assert!(message.contains("- 旅行保険や安全に関するアドバイス"));
    }

    #[test]
    fn test_fallback_plan_quotes_the_error() {
        let failed = state().with_error("研究中にエラーが発生しました: timeout");
        let plan = fallback_plan(&failed);

        assert!(plan.starts_with("# 旅行プラン生成中にエラーが発生しました"));
        assert!(plan.contains("```\n研究中にエラーが発生しました: timeout\n```"));
        assert!(plan.contains("### 基本的な金沢旅行情報"));
        assert!(plan.contains("* 滞在期間: 1泊2日"));
        assert!(plan.contains("* 予算: 10万円~15万円"));
        assert!(plan.contains("* 目的: グルメ, 温泉"));
        assert!(plan.contains("1. 事前に主要な観光スポットを調査してください"));
        assert!(plan.contains("4. 旅行保険への加入を検討してください"));
    }

    #[test]
    fn test_fallback_plan_defaults_empty_error() {
        let plan = fallback_plan(&state());

        assert!(plan.contains("```\n不明なエラーが発生しました\n```"));
    }
}

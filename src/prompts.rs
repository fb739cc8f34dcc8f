//! Centralized prompt definitions for the analysis pipes
//!
//! The same prompts back both Langbase pipe creation and the chat
//! completions provider, so every provider is held to one JSON contract.

/// System prompt for the combined (single call) analysis tier.
pub const COMBINED_ANALYSIS_PROMPT: &str = r#"You are an expert misinformation detection AI. Analyze the given text for:

1. RELIABILITY SCORE (0-100): How trustworthy and factual the content appears
2. BIAS SCORE (0-100): Level of bias, emotional manipulation, or agenda-driven language
3. SENTIMENT SCORE (-100 to 100): Emotional tone from very negative to very positive
4. CATEGORY: "reliable", "questionable", or "misinformation"
5. POSITIVE POINTS: What makes the content trustworthy
6. WARNING POINTS: Red flags, bias indicators, suspicious claims
7. RECOMMENDATIONS: What readers should do with this information
8. CONFIDENCE LEVEL (0-100): How confident you are in your analysis

Look for these warning signs:
- Conspiracy language ("they don't want you to know", "secret", "hidden truth")
- Unsupported health claims ("miracle cure", "100% effective", "instant results")
- Anti-establishment rhetoric ("big pharma", "mainstream media lies")
- Emotional manipulation and sensationalist language
- Absolute statements without evidence
- Lack of credible sources or citations

Write every explanation string in the language named by the user message.
If the text cites concrete sources, list them in an optional "sources" array.

Respond ONLY in valid JSON format like this:
{
  "reliability_score": 65,
  "bias_score": 35,
  "sentiment_score": -20,
  "category": "questionable",
  "positive_points": ["Uses some factual language", "Mentions specific data"],
  "warning_points": ["Lacks credible sources", "Uses emotional appeals"],
  "recommendations": ["Verify with authoritative sources", "Check for peer-reviewed studies"],
  "confidence_level": 80
}"#;

/// System prompt for the sentiment signal.
pub const SENTIMENT_PROMPT: &str = r#"Analyze the sentiment of the given text. Respond ONLY in this JSON format:
{
  "label": "POSITIVE" | "NEGATIVE" | "NEUTRAL",
  "score": number between 0 and 1
}"#;

/// System prompt for the bias signal.
pub const BIAS_PROMPT: &str = r#"Analyze the text for bias and manipulation. Respond ONLY in this JSON format:
{
  "bias_score": number between 0 and 100,
  "bias_indicators": ["list", "of", "specific", "bias", "indicators", "found"]
}"#;

/// System prompt for the factuality signal.
pub const FACTUALITY_PROMPT: &str = r#"Rate how factual and verifiable the given text is: concrete data, named sources, and checkable claims raise the score; speculation, rumor, and unsupported assertions lower it. Respond ONLY in this JSON format:
{
  "factuality_score": number between 0 and 100,
  "rationale": "one sentence explaining the score"
}"#;

/// User message for the combined tier
pub fn combined_user_message(content: &str, language_name: &str) -> String {
    format!(
        "Analyze this text for misinformation, bias, and reliability. Respond in {}.\n\n\"{}\"",
        language_name, content
    )
}

//! Report composition: cost and time aggregates over the matched
//! requirements, plus the personalized Hebrew report. Narrative text comes
//! from the model when a client is configured; a deterministic Markdown
//! report is both the no-model path and the fallback for any model failure,
//! so composing a report never fails.

use std::sync::{Arc, LazyLock};

use regex::Regex;
use serde::Serialize;

use crate::config;
use crate::models::{BusinessProfile, MatchedRequirement};
use crate::pipeline::llm::{CompletionClient, UsageTracker};

/// Sentinel for estimates that could not be derived from the data. Also
/// the value the extraction model is told to use for unknown costs, so
/// aggregate parsing skips it explicitly.
pub const UNDEFINED_ESTIMATE: &str = "לא מוגדר";

const NARRATIVE_SYSTEM_PROMPT: &str = "Generate clear, practical business guidance in Hebrew.";

static NUMBERS: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\d+").unwrap());

/// Sum the matched requirements' costs. Only costs carrying the shekel
/// marker count; a range contributes its midpoint. Requirements without a
/// parseable cost are left out of the sum rather than counted as zero.
pub fn total_cost_estimate(matches: &[MatchedRequirement]) -> String {
    let mut total = 0.0;
    let mut found_any = false;

    for matched in matches {
        let Some(cost) = matched.estimated_cost.as_deref() else {
            continue;
        };
        if cost == UNDEFINED_ESTIMATE || !cost.contains('₪') {
            continue;
        }
        if let Some(value) = cost_value(cost) {
            total += value;
            found_any = true;
        }
    }

    if found_any {
        format!("{} ₪ (אומדן)", group_thousands(total as u64))
    } else {
        UNDEFINED_ESTIMATE.to_string()
    }
}

/// A range like "500-800 ₪" contributes the midpoint of its first two
/// figures; a single figure is used as-is.
fn cost_value(cost: &str) -> Option<f64> {
    let numbers: Vec<u64> = NUMBERS
        .find_iter(cost)
        .filter_map(|m| m.as_str().parse().ok())
        .collect();
    match numbers.as_slice() {
        [] => None,
        [single] => Some(*single as f64),
        [first, second, ..] => Some((*first + *second) as f64 / 2.0),
    }
}

fn group_thousands(value: u64) -> String {
    let digits = value.to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, digit) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(digit);
    }
    grouped
}

/// Longest timeline across the matched requirements, in weeks. Licensing
/// processes run in parallel, so this is a critical path, never a sum.
/// Only timelines mentioning weeks count; within one timeline the largest
/// figure wins ("4-6 שבועות" reads as 6).
pub fn total_time_estimate(matches: &[MatchedRequirement]) -> String {
    let mut longest: Option<u64> = None;

    for matched in matches {
        let Some(timeline) = matched.timeline.as_deref() else {
            continue;
        };
        // שבוע also matches the plural שבועות.
        if !timeline.contains("שבוע") && !timeline.contains("week") {
            continue;
        }
        let weeks = NUMBERS
            .find_iter(timeline)
            .filter_map(|m| m.as_str().parse::<u64>().ok())
            .max();
        if let Some(weeks) = weeks {
            longest = Some(longest.map_or(weeks, |current| current.max(weeks)));
        }
    }

    match longest {
        Some(weeks) => format!("{weeks} שבועות (משוער)"),
        None => UNDEFINED_ESTIMATE.to_string(),
    }
}

fn yes_no(flag: bool) -> &'static str {
    if flag {
        "כן"
    } else {
        "לא"
    }
}

/// The deterministic Markdown report: business details, every matched
/// requirement with its justification, and the aggregate estimates.
pub fn basic_report(profile: &BusinessProfile, matches: &[MatchedRequirement]) -> String {
    let mut report = format!(
        r#"# דוח רישוי עסקים

## פרטי העסק
- **גודל**: {size} מ"ר
- **תפוסה**: {people} אנשים
- **שימוש בגז**: {gas}
- **משלוחים**: {delivery}
- **הגשת בשר**: {meat}

## רישיונות ואישורים נדרשים ({count})
"#,
        size = profile.size,
        people = profile.max_people,
        gas = yes_no(profile.uses_gas),
        delivery = yes_no(profile.has_delivery),
        meat = yes_no(profile.serves_meat),
        count = matches.len(),
    );

    for (index, requirement) in matches.iter().enumerate() {
        report.push_str(&format!(
            r#"
### {number}. {name}
- **גוף מוסמך**: {authority}
- **זמן טיפול**: {timeline}
- **עלות משוערת**: {cost}
- **סיבה**: {why}
- **תיאור**: {description}
"#,
            number = index + 1,
            name = requirement.name,
            authority = requirement.authority,
            timeline = requirement.timeline.as_deref().unwrap_or(UNDEFINED_ESTIMATE),
            cost = requirement
                .estimated_cost
                .as_deref()
                .unwrap_or(UNDEFINED_ESTIMATE),
            why = requirement.why_relevant,
            description = requirement.description,
        ));
    }

    report.push_str(&format!(
        r#"
## סיכום
- **סך הכל רישיונות**: {count}
- **עלות משוערת**: {cost}
- **זמן משוער**: {time}

**המלצה**: התחל בדרישות הכלליות ולאחר מכן עבור לדרישות הספציפיות.
"#,
        count = matches.len(),
        cost = total_cost_estimate(matches),
        time = total_time_estimate(matches),
    ));

    report
}

/// Requirement fields surfaced to the narrative model.
#[derive(Serialize)]
struct NarrativeItem<'a> {
    name: &'a str,
    authority: &'a str,
    timeline: Option<&'a str>,
    cost: Option<&'a str>,
    description: &'a str,
    why_relevant: &'a str,
}

impl<'a> From<&'a MatchedRequirement> for NarrativeItem<'a> {
    fn from(matched: &'a MatchedRequirement) -> Self {
        Self {
            name: &matched.name,
            authority: &matched.authority,
            timeline: matched.timeline.as_deref(),
            cost: matched.estimated_cost.as_deref(),
            description: &matched.description,
            why_relevant: &matched.why_relevant,
        }
    }
}

fn build_narrative_prompt(profile: &BusinessProfile, matches: &[MatchedRequirement]) -> String {
    let items: Vec<NarrativeItem> = matches.iter().map(NarrativeItem::from).collect();
    let requirements_json =
        serde_json::to_string_pretty(&items).unwrap_or_else(|_| "[]".to_string());

    format!(
        r#"צור דוח רישוי עסקים מותאם אישית בעברית עבור:

מאפייני העסק:
- גודל: {size} מ"ר
- תפוסה מקסימלית: {people} אנשים
- שימוש בגז: {gas}
- משלוחים: {delivery}
- הגשת בשר: {meat}

דרישות רלוונטיות:
{requirements_json}

צור דוח מקצועי הכולל:
1. **סיכום מנהלים** - העיקרים בקצרה
2. **רישיונות נדרשים** - רשימה ברורה עם זמנים
3. **לוח זמנים מומלץ** - איך לתעדף
4. **עלויות משוערות** - סיכום כספי
5. **רשימת פעולות** - צ'קליסט מעשי

השתמש בשפה עסקית ברורה, לא "שפת חוק"."#,
        size = profile.size,
        people = profile.max_people,
        gas = yes_no(profile.uses_gas),
        delivery = yes_no(profile.has_delivery),
        meat = yes_no(profile.serves_meat),
    )
}

/// Composes the personalized report for a survey submission.
pub struct ReportGenerator {
    ai: Option<Arc<dyn CompletionClient>>,
    usage: Arc<UsageTracker>,
}

impl ReportGenerator {
    pub fn new(ai: Option<Arc<dyn CompletionClient>>, usage: Arc<UsageTracker>) -> Self {
        Self { ai, usage }
    }

    /// Produce the report text. Uses the narrative model when available;
    /// any failure degrades to the deterministic report, so the caller
    /// always gets a complete report.
    pub async fn personalized_report(
        &self,
        profile: &BusinessProfile,
        matches: &[MatchedRequirement],
    ) -> String {
        let Some(ai) = &self.ai else {
            tracing::debug!("No narrative model configured, using the built-in report");
            return basic_report(profile, matches);
        };

        let prompt = build_narrative_prompt(profile, matches);
        match ai
            .complete(&prompt, config::NARRATIVE_MAX_TOKENS, Some(NARRATIVE_SYSTEM_PROMPT))
            .await
        {
            Ok(completion) => {
                self.usage.record(&completion.usage);
                tracing::info!(
                    output_tokens = completion.usage.output_tokens,
                    "Narrative report generated"
                );
                completion.text
            }
            Err(e) => {
                tracing::warn!(error = %e, "Narrative generation failed, using the built-in report");
                basic_report(profile, matches)
            }
        }
    }
}

//! The Hebrew extraction prompt. The JSON schema embedded here is the
//! contract `models::wire` parses; key names must stay in sync.

const PROMPT_INTRO: &str = r#"אתה מערכת AI מתקדמת המתמחה בעיבוד מסמכים רגולטוריים בעברית לצורך רישוי עסקים.

המשימה שלך: לנתח בצורה מקיפה ומדויקת את המסמך הבא ולחלץ את כל המידע הרלוונטי לבעלי עסקים."#;

const PROMPT_BODY: &str = r#"עליך לחלץ מידע מובנה ומפורט על:

1. **דרישות כלליות לעסקים** - דרישות שחלות על כל סוגי העסקים
2. **דרישות ספציפיות לפי גודל** - דרישות המתייחסות לגודל העסק במ"ר
3. **דרישות ספציפיות לפי תפוסה** - דרישות המתייחסות למספר אנשים
4. **דרישות למאפיינים מיוחדים** - גז, משלוחים, הגשת בשר
5. **גופים רגולטוריים** - כל הרשויות והמשרדים הרלוונטיים
6. **זמנים ועלויות** - לוחות זמנים ועלויות לכל דרישה
7. **פרטים חשובים נוספים** - כל מידע רלוונטי אחר

עבור כל דרישה, ציין בדיוק:
- שם הדרישה המדויק (כפי שמופיע במסמך)
- הגוף/רשות המוסמכת
- תיאור מפורט של הדרישה
- תנאי התפוסה (מספר מקומות/אנשים - אם רלוונטי)
- תנאי שטח (גודל במ"ר - אם רלוונטי)
- תנאים מיוחדים (שימוש בגז, משלוחים, הגשת בשר - אם רלוונטי)
- זמן טיפול משוער
- עלות משוערת
- רמת חשיבות/עדיפות
- היכן במסמך הדרישה מופיעה
- הערות או תנאים נוספים

שים לב מיוחד לגופים רגולטוריים כמו:
- דרישות של משרד הבריאות
- דרישות כבאות ובטיחות
- רישיונות עסק ברשויות מקומיות
- דרישות לעסקי מזון
- אישורי בנייה ותכנון
- דרישות סביבתיות
- דרישות עבודה וביטחון
- מיסוי ורישום

החזר תשובה בפורמט JSON הבא:
{
"document_analysis": {
    "total_requirements_found": מספר_כולל,
    "document_sections": ["רשימת החלקים הראשיים במסמך"],
    "regulatory_authorities": ["רשימת כל הגופים המוסמכים"],
    "processing_notes": "הערות על תהליך העיבוד",
    "document_length": מספר_מילים,
    "extraction_confidence": "גבוהה/בינונית/נמוכה"
},
"general_requirements": [
    {
    "id": "general_001",
    "name": "שם הדרישה",
    "category": "קטגוריה כללית",
    "authority": "הגוף המוסמך",
    "description": "תיאור מפורט של הדרישה",
    "applies_to": "כל העסקים/עסקים מסוג מסוים",
    "timeline": "זמן טיפול",
    "estimated_cost": "עלות משוערת",
    "priority": "גבוהה/בינונית/נמוכה",
    "source_location": "היכן במסמך",
    "additional_notes": "הערות נוספות"
    }
],
"size_specific_requirements": [
    {
    "id": "size_001",
    "name": "שם הדרישה",
    "category": "דרישות לפי גודל",
    "authority": "הגוף המוסמך",
    "description": "תיאור מפורט",
    "conditions": {
        "min_size_sqm": מספר_או_null,
        "max_size_sqm": מספר_או_null,
        "size_notes": "הערות על הגודל"
    },
    "timeline": "זמן טיפול",
    "estimated_cost": "עלות",
    "priority": "רמת חשיבות",
    "source_location": "מיקום במסמך",
    "additional_notes": "הערות"
    }
],
"capacity_specific_requirements": [
    {
    "id": "capacity_001",
    "name": "שם הדרישה",
    "category": "דרישות לפי תפוסה",
    "authority": "הגוף המוסמך",
    "description": "תיאור מפורט",
    "conditions": {
        "min_capacity": מספר_או_null,
        "max_capacity": מספר_או_null,
        "capacity_notes": "הערות על התפוסה"
    },
    "timeline": "זמן טיפול",
    "estimated_cost": "עלות",
    "priority": "רמת חשיבות",
    "source_location": "מיקום במסמך",
    "additional_notes": "הערות"
    }
],
"feature_specific_requirements": [
    {
    "id": "feature_001",
    "name": "שם הדרישה",
    "category": "דרישות לפי מאפיינים",
    "authority": "הגוף המוסמך",
    "description": "תיאור מפורט",
    "conditions": {
        "requires_gas": true/false/null,
        "has_delivery": true/false/null,
        "serves_meat": true/false/null,
        "feature_notes": "הערות על המאפיינים"
    },
    "timeline": "זמן טיפול",
    "estimated_cost": "עלות",
    "priority": "רמת חשיבות",
    "source_location": "מיקום במסמך",
    "additional_notes": "הערות"
    }
],
"important_information": [
    {
    "topic": "נושא חשוב",
    "description": "מידע חשוב שלא נכנס לקטגוריות הקודמות",
    "relevance": "למה זה חשוב",
    "source_location": "מיקום במסמך"
    }
]
}

הוראות חשובות:
1. אל תמציא מידע - רק מה שמופיע במסמך
2. אם משהו לא ברור, ציין "לא מוגדר" או "דורש בדיקה נוספת"
3. שמור על דיוק מקסימלי - זה ייושם במערכת אמיתית
4. התמקד בדרישות מעשיות לבעלי עסקים קטנים-בינוניים
5. זהה קשרים בין דרישות שונות
6. שים לב לחריגים ותנאים מיוחדים"#;

/// Build the single-shot extraction prompt around the normalized document
/// text. Extraction runs without a system prompt.
pub fn build_extraction_prompt(document_text: &str) -> String {
    format!("{PROMPT_INTRO}\n\nהמסמך לעיבוד:\n{document_text}\n\n{PROMPT_BODY}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prompt_embeds_document_text() {
        let prompt = build_extraction_prompt("=== SECTION_HEADER: פרק 1 ===\nתוכן המסמך");
        assert!(prompt.contains("תוכן המסמך"));
        assert!(prompt.contains("המסמך לעיבוד:"));
    }

    #[test]
    fn prompt_document_sits_between_intro_and_schema() {
        let prompt = build_extraction_prompt("XYZZY");
        let doc_pos = prompt.find("XYZZY").unwrap();
        assert!(prompt.find("המשימה שלך").unwrap() < doc_pos);
        assert!(doc_pos < prompt.find("general_requirements").unwrap());
    }

    #[test]
    fn prompt_schema_matches_wire_keys() {
        let prompt = build_extraction_prompt("doc");
        for key in [
            "\"document_analysis\"",
            "\"general_requirements\"",
            "\"size_specific_requirements\"",
            "\"capacity_specific_requirements\"",
            "\"feature_specific_requirements\"",
            "\"important_information\"",
            "\"min_size_sqm\"",
            "\"max_capacity\"",
            "\"requires_gas\"",
            "\"has_delivery\"",
            "\"serves_meat\"",
            "\"source_location\"",
        ] {
            assert!(prompt.contains(key), "missing schema key {key}");
        }
    }

    #[test]
    fn prompt_forbids_invented_data() {
        let prompt = build_extraction_prompt("doc");
        assert!(prompt.contains("אל תמציא מידע"));
    }
}

// All LLM prompt constants for the analyze pipeline.
// The system instruction itself is operator-maintained configuration
// (prompt/system-prompt.md), loaded at startup and passed in — never read
// from disk here.

/// User-prompt template for briefing analysis. The compact-output rules keep
/// the response inside the token cap; the briefing follows the separator.
/// Replace `{briefing_text}` before sending.
const ANALYZE_PROMPT_TEMPLATE: &str = "\
Analyseer deze klantbriefing en genereer de offerte als JSON.

REGELS:
- Geef ALLEEN het JSON-object, geen markdown codeblokken of tekst eromheen.
- Maximaal 1-2 zinnen per beschrijving. Geen herhalingen.
- Arrays (screeningcriteria, kwaliteitsmaatregelen, etc.) max 4-5 items.
- Houd de totale output zo compact mogelijk.

---

{briefing_text}";

/// Builds the analyze user prompt for a raw client briefing.
pub fn build_analyze_prompt(briefing_text: &str) -> String {
    ANALYZE_PROMPT_TEMPLATE.replace("{briefing_text}", briefing_text)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prompt_appends_briefing_after_separator() {
        let prompt = build_analyze_prompt("Wij zoeken 500 huiseigenaren in NL.");
        let separator = prompt.find("\n---\n").expect("separator missing");
        let briefing = prompt.find("Wij zoeken 500 huiseigenaren").unwrap();
        assert!(briefing > separator);
    }

    #[test]
    fn test_prompt_carries_compact_output_rules() {
        let prompt = build_analyze_prompt("x");
        assert!(prompt.contains("ALLEEN het JSON-object"));
        assert!(prompt.contains("zo compact mogelijk"));
        assert!(!prompt.contains("{briefing_text}"));
    }
}

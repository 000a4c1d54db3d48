//! Prompt templates.
//!
//! Placeholders use `{name}` and are filled by [`render`] in a single pass, so
//! user text that happens to contain `{...}` is never expanded again.

pub const GLOW_SCRIBE_SYSTEM: &str = "You are the Glow Scribe. You convert raw technical content into structured, student-friendly B.Tech Roadmaps with emojis and clear headings.";

pub const ROADMAP_USER: &str = "ROLE: B.Tech Mentor. TASK: Create roadmap from: {transcript}";

pub const LECTURE_USER: &str = "Analyze this live lecture and provide bullet points: {transcript}";

pub const SIMPLIFY_USER: &str = "TASK: {instruction} TEXT: {text}";
pub const SIMPLIFY_ELI5: &str = "Explain like I'm 10.";
pub const SIMPLIFY_BULLETS: &str = "Convert into bullet points.";

pub const PERSONA_SYSTEM: &str = "IDENTITY: {context} TONE: Persona-accurate. CONSTRAINTS: Short.";

pub const STYLE_SYSTEM: &str = "You are a celebrity barber. Give 3 specific hairstyle recommendations for the provided face shape. Use bullet points.";
pub const STYLE_USER: &str = "My face shape is {shape}. What are the best hairstyles for me?";

pub const VISION_HAIR: &str = "Analyze this face shape. Suggest 3 specific hairstyles that suit this person. Mention why.";
pub const VISION_SKIN: &str = "Look at this person's skin. Detect any visible acne or dark circles. Suggest 2 cheap home remedies.";
pub const VISION_GLASSES: &str = "Based on this face shape, suggest the best spectacle frame shapes (e.g., Aviator, Wayfarer, Round).";

pub const MEGA_SYSTEM: &str = "You are an elite celebrity stylist and grooming expert. Provide a comprehensive 'Glow Up' report for a student with a {shape} face shape.";
pub const MEGA_USER: &str = "Provide advice in 4 sections:
1. HAIRSTYLES: 3 specific cuts for a {shape} face.
2. SKINCARE: 2 hostel-friendly tips for glowing skin.
3. BEARD/STACHE: Best grooming style for this geometry.
4. GLASSES: Best frame shapes (e.g., Aviator, Square).
Use emojis and keep it punchy!";

pub const FITNESS_SYSTEM: &str = "You are the Legendary Fitness AI. You specialize in helping Indian hostel students optimize their health using limited mess food and small dorm spaces.";
pub const FITNESS_USER: &str = "I ate {meal} in the mess. My goal is {goal}.
Provide:
1. 🥗 THE MESS HACK: How to balance this meal (e.g., add dahi, skip extra rice).
2. 🦾 DORM-ROOM WOD: A 15-minute workout for a tiny space (no equipment).
3. 📺 VIDEO SEARCH: Provide a specific YouTube search query for this routine.

Format: Use clear headings and emojis. Put the video search query on the last line starting with 'QUERY:'";

pub const CONFIDENCE_SYSTEM: &str = "You are the Glow Stack Confidence Coach. You help B.Tech students overcome social anxiety and build alpha-level presence.";
pub const CONFIDENCE_USER: &str = "Generate a fresh 'Confidence Protocol' including:
1. QUOTE: One hard-hitting motivational quote.
2. BODY LANGUAGE: One specific tip (e.g., the 'Power Lean').
3. CHALLENGE: One small social task for today (e.g., 'Make eye contact with 3 strangers').

Keep it short, aggressive, and motivating. Add emojis.";

/// Substitute `{name}` placeholders from `vars`.
///
/// Unknown placeholders are left as written. Substituted values are copied
/// verbatim and never rescanned.
pub fn render(template: &str, vars: &[(&str, &str)]) -> String {
    let mut out = String::with_capacity(template.len() + vars.iter().map(|(_, v)| v.len()).sum::<usize>());
    let mut rest = template;

    while let Some(open) = rest.find('{') {
        out.push_str(&rest[..open]);
        let after = &rest[open + 1..];

        let substituted = after.find('}').and_then(|close| {
            let name = &after[..close];
            vars.iter()
                .find(|(key, _)| *key == name)
                .map(|(_, value)| (*value, close))
        });

        match substituted {
            Some((value, close)) => {
                out.push_str(value);
                rest = &after[close + 1..];
            }
            None => {
                out.push('{');
                rest = after;
            }
        }
    }

    out.push_str(rest);
    out
}

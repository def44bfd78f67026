//! Prompt templates
//!
//! Static prompt text with `{slot}` placeholders filled at agent construction.

/// A static prompt with named `{slot}` placeholders
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PromptTemplate(&'static str);

impl PromptTemplate {
    pub const fn new(text: &'static str) -> Self {
        Self(text)
    }

    /// Raw template text
    pub fn text(&self) -> &'static str {
        self.0
    }

    /// Replace each `{name}` with its value. Unknown slots are left as-is.
    pub fn fill(&self, slots: &[(&str, &str)]) -> String {
        slots
            .iter()
            .fold(self.0.to_string(), |text, (name, value)| {
                text.replace(&format!("{{{}}}", name), value)
            })
    }
}

/// Supervisor instructions; `{members}` is the comma-separated worker list
pub const SUPERVISOR_SYSTEM: PromptTemplate = PromptTemplate::new(
    "You are a supervisor managing a conversation between the following workers: {members}. \
     Given the user request, respond with the worker that should act next. Each worker will \
     perform a task and report its results and status. When the work is finished, respond \
     with {finish}.",
);

/// Closing instruction after the history; `{options}` lists every valid choice
pub const SUPERVISOR_ROUTE: PromptTemplate = PromptTemplate::new(
    "Given the conversation above, who should act next? Or should we {finish}? \
     Select one of: {options}",
);

/// Researcher instructions
pub const RESEARCHER_SYSTEM: PromptTemplate = PromptTemplate::new(
    "You are a web researcher writing a market research document.\n\
     \n\
     You will receive a research objective that may carry extra details. Ignore personal \
     demographics of the requester (income, age, gender, occupation). Pay attention to the \
     market and region (country, city) the objective points at, infer the topic, and research it.\n\
     \n\
     Back every claim with a source, written as a shorthand Markdown hyperlink, and list all \
     sources at the end. Statista and Euromonitor are good sources of market data, but do not \
     limit yourself to them. Start with a fitting title, then search the web to cover:\n\
     \n\
     - Introduction\n\
     - Market Overview\n\
     \x20\x20* Market size\n\
     \x20\x20* Market trends\n\
     \x20\x20* Consumer demographics (age, gender, income; sourcing is critical here)\n\
     \x20\x20* Anything else you judge important\n\
     - Competitor Analysis\n\
     \x20\x20* Key players, major and minor\n\
     \x20\x20* Market share\n\
     \x20\x20* Anything else you judge important\n\
     - SWOT Analysis (emphasis on opportunities)\n\
     - Regulatory Landscape\n\
     - Key insights and quirks of the market in this country or region\n\
     - Summary",
);

//! LLM-driven discovery features over an ingested corpus.
//!
//! Every function takes the [`IngestionResult`] explicitly and sends a fixed,
//! templated prompt through an [`LlmClient`]. Features share nothing except
//! read access to the corpus, and a failure in one never touches another.
//! There are no retries.

use crate::contract::{LlmClient, LlmError};
use crate::ingest::IngestionResult;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::OnceLock;
use thiserror::Error;
use tracing::{error, info};

#[derive(Debug, Error)]
pub enum FeatureError {
    #[error("Please ingest code first.")]
    NoCorpus,
    #[error("Please enter a question.")]
    EmptyQuestion,
    #[error("No response received.")]
    EmptyResponse,
    #[error("Invalid analysis format from LLM: {0}")]
    InvalidResponse(String),
    #[error(transparent)]
    Llm(#[from] LlmError),
}

/// Entities and function calls extracted from the corpus.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComponentAnalysis {
    pub entities: Vec<String>,
    pub functions: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ItemKind {
    Entity,
    Function,
}

impl fmt::Display for ItemKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ItemKind::Entity => f.write_str("entity"),
            ItemKind::Function => f.write_str("function"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiagramKind {
    Sequence,
    DataFlow,
    Class,
    State,
}

impl DiagramKind {
    fn label(self) -> &'static str {
        match self {
            DiagramKind::Sequence => "sequence",
            DiagramKind::DataFlow => "dfd",
            DiagramKind::Class => "class",
            DiagramKind::State => "state",
        }
    }

    fn instruction(self) -> &'static str {
        match self {
            DiagramKind::Sequence => "Generate a Mermaid sequence diagram",
            DiagramKind::DataFlow => "Generate a Mermaid Data Flow diagram",
            DiagramKind::Class => "Generate a Mermaid class diagram",
            DiagramKind::State => "Generate a Mermaid state diagram",
        }
    }
}

/// One generated section of a business requirements document.
#[derive(Debug)]
pub struct BrdSection {
    pub title: &'static str,
    pub html: Result<String, FeatureError>,
}

/// Section titles and their instructions, generated in this order.
pub const BRD_SECTIONS: &[(&str, &str)] = &[
    ("Introduction", "Examine the code snippet and craft an Introduction section that describes the solution's purpose, overall goals, and intended audience."),
    ("Business Objectives", "Analyze the code snippet to identify the business objectives. Align them with organizational goals and propose key performance indicators or success criteria."),
    ("Project Scope", "Review the code snippet to define the project scope, highlighting in-scope and out-of-scope elements, along with any constraints implied by the code."),
    ("Stakeholder Analysis", "Determine who the stakeholders are based on the code snippet's functionality. Describe their roles, responsibilities, and how they interact with the solution."),
    ("Functional Requirements", "Extract functional requirements from the code snippet. For each requirement, provide a concise description, priority, and acceptance criteria."),
    ("Non-Functional Requirements", "Identify non-functional requirements (like performance, security, or usability) suggested by the code snippet."),
    ("Use Cases / User Stories", "Derive use cases or user stories from the code snippet. Include user goals, main flows, and any alternative paths the code might support."),
    ("Assumptions and Dependencies", "Outline assumptions about environment or data, and dependencies on external systems, libraries, or services."),
    ("Constraints", "Highlight any technical, regulatory, or organizational constraints inferred from the code that shape the project."),
    ("Risks and Mitigations", "Identify potential risks associated with implementing the code and suggest possible mitigation or contingency strategies."),
    ("Acceptance Criteria and Approval", "Propose acceptance criteria for verifying the code's functionality, and outline the sign-off or approval process once those criteria are met."),
];

fn corpus(result: &IngestionResult) -> Result<&str, FeatureError> {
    if result.corpus.trim().is_empty() {
        return Err(FeatureError::NoCorpus);
    }
    Ok(&result.corpus)
}

async fn call<C: LlmClient + ?Sized>(
    client: &C,
    feature: &str,
    system_prompt: &str,
    user_text: &str,
) -> Result<String, FeatureError> {
    info!(feature, prompt_len = user_text.len(), "Calling LLM");
    match client.complete(system_prompt, user_text).await {
        Ok(text) if text.trim().is_empty() => {
            error!(feature, "LLM returned an empty response");
            Err(FeatureError::EmptyResponse)
        }
        Ok(text) => Ok(text),
        Err(e) => {
            error!(feature, error = %e, "LLM call failed");
            Err(e.into())
        }
    }
}

/// Removes Markdown code fences (```` ``` ```` with an optional language tag).
pub fn strip_code_fences(text: &str) -> String {
    static FENCE: OnceLock<Regex> = OnceLock::new();
    let fence = FENCE.get_or_init(|| Regex::new(r"```(\w+)?").expect("valid fence regex"));
    fence.replace_all(text, "").trim().to_string()
}

/// Drops inline `style` attributes from generated HTML.
pub fn clean_html(html: &str) -> String {
    static STYLE: OnceLock<Regex> = OnceLock::new();
    let style = STYLE.get_or_init(|| {
        Regex::new(r#"(?i)\s+style\s*=\s*("[^"]*"|'[^']*')"#).expect("valid style regex")
    });
    style.replace_all(html, "").trim().to_string()
}

pub async fn ask_question<C: LlmClient + ?Sized>(
    client: &C,
    result: &IngestionResult,
    question: &str,
) -> Result<String, FeatureError> {
    let code = corpus(result)?;
    let question = question.trim();
    if question.is_empty() {
        return Err(FeatureError::EmptyQuestion);
    }
    let system = "You are an expert on code functionality. Answer the question based on the given code snippet. Provide a concise and clear answer in plain text.";
    let user = format!(
        "Code:\n{code}\n\nQuestion:\n{question}\n\nProvide an answer based on the code."
    );
    let answer = call(client, "ask", system, &user).await?;
    Ok(strip_code_fences(&answer))
}

pub async fn analyze_components<C: LlmClient + ?Sized>(
    client: &C,
    result: &IngestionResult,
) -> Result<ComponentAnalysis, FeatureError> {
    let code = corpus(result)?;
    let system = "You are a code analysis expert. Respond with ONLY valid JSON containing 'entities' and 'functions' arrays.";
    let user = format!(
        "Extract ALL entities (classes, interfaces, structs) and ALL function/API calls from this code.\n\
         Respond with ONLY this JSON structure:\n\
         {{\n  \"entities\": [\"entity1\", \"entity2\", ...],\n  \"functions\": [\"function1()\", \"function2()\", ...]\n}}\n\
         Code to analyze:\n{code}"
    );
    let raw = call(client, "components", system, &user).await?;
    let cleaned = strip_code_fences(&raw);

    #[derive(Deserialize)]
    struct RawAnalysis {
        entities: Option<Vec<String>>,
        functions: Option<Vec<String>>,
    }

    let parsed: RawAnalysis = serde_json::from_str(&cleaned).map_err(|e| {
        error!(error = %e, "Component analysis was not valid JSON");
        FeatureError::InvalidResponse(e.to_string())
    })?;
    match (parsed.entities, parsed.functions) {
        (Some(entities), Some(functions)) => {
            info!(
                entities = entities.len(),
                functions = functions.len(),
                "Component analysis parsed"
            );
            Ok(ComponentAnalysis {
                entities,
                functions,
            })
        }
        _ => Err(FeatureError::InvalidResponse(
            "missing 'entities' or 'functions'".to_string(),
        )),
    }
}

pub async fn explain_item<C: LlmClient + ?Sized>(
    client: &C,
    result: &IngestionResult,
    item_name: &str,
    kind: ItemKind,
) -> Result<String, FeatureError> {
    let code = corpus(result)?;
    let system = "You are an expert on COBOL code. Given a code snippet and the name of a particular entity or function call, provide a short plain-text description of what it is and how it is used.";
    let user = format!("CODE:\n{code}\n\nITEM: {item_name} (type: {kind})\nExplain usage/purpose.");
    let explanation = call(client, "explain", system, &user).await?;
    Ok(explanation.trim().to_string())
}

/// Generates every BRD section in order. A failed section is recorded and
/// the remaining sections are still generated.
pub async fn generate_brd<C: LlmClient + ?Sized>(
    client: &C,
    result: &IngestionResult,
) -> Result<Vec<BrdSection>, FeatureError> {
    let code = corpus(result)?;
    let system = "You are a BRD generation expert. You MUST respond with ONLY valid HTML for the specified BRD section.";
    let mut sections = Vec::with_capacity(BRD_SECTIONS.len());
    for (i, &(title, instruction)) in BRD_SECTIONS.iter().enumerate() {
        info!(section = i + 1, total = BRD_SECTIONS.len(), title, "Generating BRD section");
        let user = format!(
            "\nReference only from this code:\n---------------\n{code}\n---------------\n\
             Generate the \"{title}\" section of a comprehensive BRD in HTML format.\n\
             {instruction}\nRespond with valid HTML only.\n"
        );
        let html = call(client, "brd", system, &user)
            .await
            .map(|html| clean_html(&html));
        sections.push(BrdSection { title, html });
    }
    Ok(sections)
}

pub async fn generate_test_cases<C: LlmClient + ?Sized>(
    client: &C,
    result: &IngestionResult,
) -> Result<String, FeatureError> {
    let code = corpus(result)?;
    let system = "You are a test case generation expert. Respond with ONLY valid plain text containing test cases for the given code.";
    let user = format!(
        "Generate a set of test cases for the following code:\n\n{code}\n\nProvide a list of test cases in plain text format."
    );
    let text = call(client, "test-cases", system, &user).await?;
    Ok(strip_code_fences(&text))
}

pub async fn generate_pseudo_code<C: LlmClient + ?Sized>(
    client: &C,
    result: &IngestionResult,
) -> Result<String, FeatureError> {
    let code = corpus(result)?;
    let system = "You are a pseudo code generation expert. Respond with ONLY valid pseudo code for the given code.";
    let user = format!(
        "Generate pseudo code for the following code:\n\n{code}\n\nProvide a clear pseudo code representation."
    );
    let text = call(client, "pseudo-code", system, &user).await?;
    Ok(strip_code_fences(&text))
}

pub async fn analyze_database<C: LlmClient + ?Sized>(
    client: &C,
    result: &IngestionResult,
) -> Result<String, FeatureError> {
    let code = corpus(result)?;
    let system = "You are an expert in COBOL and database systems. Analyze the given code and explain the database structure in detail. Format the output in HTML.";
    let html = call(client, "database", system, code).await?;
    Ok(clean_html(&html))
}

pub async fn generate_schema<C: LlmClient + ?Sized>(
    client: &C,
    result: &IngestionResult,
) -> Result<String, FeatureError> {
    let code = corpus(result)?;
    let system = "You are an expert in COBOL and modern databases. Convert the given COBOL database structure into a modern RDBMS schema. Format the output in HTML.";
    let html = call(client, "schema", system, code).await?;
    Ok(clean_html(&html))
}

/// Returns Mermaid source; turning it into graphics is left to the caller.
pub async fn generate_diagram<C: LlmClient + ?Sized>(
    client: &C,
    result: &IngestionResult,
    kind: DiagramKind,
) -> Result<String, FeatureError> {
    let code = corpus(result)?;
    let system = format!(
        "You are an expert in COBOL code analysis and diagram generation. Generate a Mermaid {} diagram.",
        kind.label()
    );
    let user = format!(
        "\nFollow these instructions:\n{}\nfor the code below:\n{code}\n\
         Respond with ONLY valid Mermaid code (no extra text).\nEnsure text labels are properly escaped.\n",
        kind.instruction()
    );
    let source = call(client, "diagram", &system, &user).await?;
    Ok(strip_code_fences(&source))
}

//! Per-section prompt and citation tables.

use crate::transport::Citation;

const SYSTEM_MESSAGES: &[(&str, &str)] = &[
    (
        "项目背景",
        "You are an expert business consultant helping to write the Background section of a business plan. Provide comprehensive context about the market situation, problem being solved, and the opportunity. Include relevant historical context and current trends.",
    ),
    (
        "市场分析",
        "You are a market research analyst. Provide detailed market analysis with specific data points, growth trends, and market size information. Include information about market segments, target customers, and competitive landscape. Always include specific percentages, numbers, and growth rates.",
    ),
    (
        "商业模式",
        "You are a business model expert. Describe a comprehensive business model including revenue streams, pricing strategy, customer acquisition channels, and value proposition. Be specific about how the business will make money.",
    ),
    (
        "财务预测",
        "You are a financial analyst. Create realistic financial projections including revenue forecasts, cost structure, break-even analysis, and funding requirements. Use specific numbers and timeframes.",
    ),
    (
        "风险分析",
        "You are a risk management consultant. Identify potential risks and challenges the business might face, along with mitigation strategies. Consider market risks, operational risks, financial risks, and regulatory risks.",
    ),
    (
        "团队介绍",
        "You are an HR consultant. Create compelling team descriptions highlighting relevant experience, skills, and achievements of key team members. Emphasize how the team's background makes them uniquely qualified for this venture.",
    ),
    (
        "发展规划",
        "You are a strategic planning expert. Outline a clear roadmap for business growth with specific milestones, timelines, and objectives. Include short-term, medium-term, and long-term goals.",
    ),
];

pub const GENERIC_SYSTEM_MESSAGE: &str =
    "You are helping to write a professional business plan. Provide detailed, well-structured content.";

pub const CONTINUE_INSTRUCTION: &str = "Please continue from where you left off.";

const CITATIONS: &[(&str, &str, &str)] = &[
    ("市场分析", "IMF 2024 报告", "https://www.imf.org/reports"),
    (
        "财务预测",
        "McKinsey Global Institute Analysis 2024",
        "https://www.mckinsey.com/mgi/overview",
    ),
];

/// System instruction for `title`; unknown titles get the generic instruction.
pub fn system_instruction(title: &str) -> &'static str {
    SYSTEM_MESSAGES
        .iter()
        .find(|(t, _)| *t == title)
        .map(|(_, message)| *message)
        .unwrap_or(GENERIC_SYSTEM_MESSAGE)
}

pub fn has_dedicated_instruction(title: &str) -> bool {
    SYSTEM_MESSAGES.iter().any(|(t, _)| *t == title)
}

/// Citation attached to `title` on completion, if the section has one.
pub fn citation_for(title: &str) -> Option<Citation> {
    CITATIONS
        .iter()
        .find(|(t, _, _)| *t == title)
        .map(|(_, text, url)| Citation::new(*text, *url))
}

/// User request naming the section, with an optional extra prompt.
pub fn section_request(title: &str, prompt: Option<&str>) -> String {
    let base = format!(
        "Generate content for the \"{}\" section of a business plan.",
        title
    );
    match prompt.map(str::trim).filter(|p| !p.is_empty()) {
        Some(prompt) => format!("{} {}", base, prompt),
        None => base,
    }
}

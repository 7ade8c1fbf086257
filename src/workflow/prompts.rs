//! 各阶段的角色设定与任务文本
//!
//! 角色设定作为系统消息，任务文本连同章节文本作为用户消息。
//! 所有分析阶段都遵守同一条规则：章节中没有明确给出的信息回答 NOT REPORTED，不做推断。

use crate::workflow::stage::StageId;

/// 章节缺失时的统一要求
const NO_INFERENCE_RULE: &str = "If information is not explicitly present in the provided text, \
respond with NOT REPORTED. Do not infer.";

/// 证据等级层级
pub const EVIDENCE_HIERARCHY: &str = "\
   - High: RCT, Meta-Analysis
   - Medium: Cohort, Case-Control
   - Low: Cross-sectional, Animal, Narrative Review";

/// 利益冲突标记的映射规则
pub const COI_POLICY: &str = "\
- has_conflict_of_interest = true when the paper explicitly discloses industry funding or financial ties of the authors
- has_conflict_of_interest = false when the authors explicitly declare no conflicts
- has_conflict_of_interest = null when nothing is reported or the statement is ambiguous";

/// 阶段的角色设定（系统消息）
pub fn framing(stage: StageId) -> &'static str {
    match stage {
        StageId::Title => {
            "You are the Title Extractor, a meticulous research assistant who always finds \
             the exact title of scientific papers."
        }
        StageId::Classification => {
            "You are the Study Taxonomist. You classify scientific study designs with precision \
             and distinguish RCTs, cohorts, meta-analyses and reviews instantly. \
             You never hallucinate study types."
        }
        StageId::Triage => {
            "You are the Nutrition Metadata Specialist, an investigative journalist who trusts \
             the Taxonomist's classification and hunts for industry funding."
        }
        StageId::Methodology => {
            "You are the Experimental Design Critic, a senior scientist who looks for \
             'straw man' comparisons and healthy user bias."
        }
        StageId::Statistics => {
            "You are the Statistical Auditor. You do not trust headlines and read the data \
             tables to find the real effect size."
        }
        StageId::Synthesis => {
            "You are the Lead Principal Investigator. You take the findings of your team and \
             produce the final structured verdict as a single JSON object."
        }
    }
}

/// 阶段的任务文本（用户消息主体）
///
/// `section_text` 由阶段的输入构造函数给出，缺失章节已替换为占位语。
pub fn task(stage: StageId, section_text: &str) -> String {
    match stage {
        StageId::Title => format!(
            "Extract the official paper title from the text below.

Rules:
- The title appears near the beginning of the text, usually right before the authors' names
- Output the title EXACTLY as written
- Do not include authors, journal names, or affiliations
- If the title cannot be confidently identified, respond with NOT FOUND

Text:
{section_text}"
        ),
        StageId::Classification => format!(
            "Analyze the Abstract and Methods below to classify the study design.

Options (choose ONE):
- RCT (Randomized Controlled Trial)
- Cohort Study (Prospective/Retrospective)
- Cross-Sectional Study
- Case-Control Study
- Systematic Review / Meta-Analysis
- Narrative Review
- Animal/In-vitro Study

Look for keywords: \"randomized\", \"double-blind\" (RCT); \"followed up\", \"baseline\" (Cohort); \
\"snapshot\", \"survey\" (Cross-sectional).

Text:
{section_text}"
        ),
        StageId::Triage => format!(
            "1. Read the study classification provided by the Study Taxonomist.
2. Assign an Evidence Level (High/Medium/Low) based on that classification.
{EVIDENCE_HIERARCHY}
3. Analyze the text below for Conflicts of Interest (COI) and Funding.

Text:
{section_text}

{NO_INFERENCE_RULE}"
        ),
        StageId::Methodology => format!(
            "Critique the Methods. Use the study type identified by the Taxonomist to guide your critique.

Check for:
- Control group quality
- Dosage/Intervention realism
- Confounding adjustments (if observational)
- Randomization methods (if RCT)

Text:
{section_text}

{NO_INFERENCE_RULE}"
        ),
        StageId::Statistics => format!(
            "Audit the results for statistical rigor, focusing on effect sizes and significance.

Step 1: Report key results with context:
- Main findings: quote effect sizes, CIs, p-values
- Relative vs absolute risk (e.g. RR 1.2 [1.1-1.3] = 20% relative increase, but absolute 2% vs 1.7%)
- Surrogate markers (e.g. LDL) vs hard outcomes (CVD events, mortality)

Step 2: Check for issues:
- P-hacking/multiplicity (too many tests? Bonferroni?)
- Statistical vs clinical significance
- Subgroup analyses (pre-specified? powered?)

Answer as a bulleted audit:
- Key Results: [RR/OR/HR with CIs; relative/absolute]
- Endpoints: [Surrogate/Clinical/Mixed]
- Stat Issues: [p-hacking, multiplicity, etc.]
- Trust in numbers: [High/Med/Low] and why

Paper text:
{section_text}

{NO_INFERENCE_RULE}"
        ),
        StageId::Synthesis => synthesis_task(),
    }
}

/// 综合阶段的任务：要求输出完整字段的 JSON 对象
fn synthesis_task() -> String {
    format!(
        "Create the final report from the reports of the Title Extractor, Study Taxonomist, \
Metadata Specialist, Experimental Design Critic and Statistical Auditor below.

Output ONE JSON object with ACTUAL DATA values and nothing else. Do not output a JSON Schema \
definition. Every key below must be present; use null when a value is unknown.

{{
  \"title\": string | null,
  \"paper_type\": string | null,
  \"evidence_level\": \"High\" | \"Medium\" | \"Low\" | null,
  \"has_conflict_of_interest\": true | false | null,
  \"funding_source\": string | null,
  \"coi_notes\": string | null,
  \"control_group_quality\": string | null,
  \"intervention_details\": string | null,
  \"confounding_factors\": string | null,
  \"primary_outcome\": string | null,
  \"risk_type_reported\": string | null,
  \"endpoints\": string | null,
  \"statistical_significance\": string | null,
  \"conclusion_summary\": string | null,
  \"trust_score\": integer from 1 to 10 | null,
  \"final_verdict\": string | null
}}

Evidence level hierarchy:
{EVIDENCE_HIERARCHY}

Conflict of interest:
{COI_POLICY}

Use null for trust_score when the evidence is insufficient to score."
    )
}

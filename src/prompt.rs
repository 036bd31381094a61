//! Prompt construction for the generation backends.
//!
//! Pure functions: (sampled text, material type, options) -> one instruction
//! string. The base block pins the hard constraints (Japanese-only output, no
//! reasoning traces, faithfulness to source, Markdown conventions), then a
//! material-type template fixes the exact output skeleton the validator will
//! later count against.

use crate::domain::{
  BlankNumberPosition, BlankNumberType, BlankStyle, Difficulty, GenerationOptions, MaterialType,
  QuizType,
};

/// Difficulty-specific guidance, three-way lookup.
pub fn difficulty_guidance(d: Difficulty) -> &'static str {
  match d {
    Difficulty::Beginner => "短く簡潔な問いを中心にし、基本用語の定義の確認を最優先してください。",
    Difficulty::Intermediate => "定義に加えて、理由付けや概念同士の関連づけを問うてください。",
    Difficulty::Advanced => "比較・因果関係・複数概念の統合を問う発展的な内容にしてください。",
  }
}

/// The literal blank example shown to the model. 3 styles x 3 number positions.
pub fn blank_example(style: BlankStyle, position: BlankNumberPosition) -> &'static str {
  match (style, position) {
    (BlankStyle::Underline, BlankNumberPosition::After) => "_____（1）",
    (BlankStyle::Underline, BlankNumberPosition::Before) => "（1）_____",
    (BlankStyle::Underline, BlankNumberPosition::Above) => "  1\n_____",
    (BlankStyle::Box, BlankNumberPosition::After) => "□□□□□（1）",
    (BlankStyle::Box, BlankNumberPosition::Before) => "（1）□□□□□",
    (BlankStyle::Box, BlankNumberPosition::Above) => "  1\n□□□□□",
    (BlankStyle::Parentheses, BlankNumberPosition::After) => "（　　　　）（1）",
    (BlankStyle::Parentheses, BlankNumberPosition::Before) => "（1）（　　　　）",
    (BlankStyle::Parentheses, BlankNumberPosition::Above) => "  1\n（　　　　）",
  }
}

fn blank_style_wording(style: BlankStyle) -> &'static str {
  match style {
    BlankStyle::Underline => "下線",
    BlankStyle::Box => "四角",
    BlankStyle::Parentheses => "かっこ",
  }
}

fn blank_number_wording(t: BlankNumberType) -> &'static str {
  match t {
    BlankNumberType::Numeric => "数字 (1, 2, 3...)",
    BlankNumberType::Alphabetic => "アルファベット (a, b, c...)",
    BlankNumberType::Roman => "ローマ数字 (i, ii, iii...)",
    BlankNumberType::NoNumber => "番号なし",
  }
}

fn blank_position_wording(p: BlankNumberPosition) -> &'static str {
  match p {
    BlankNumberPosition::After => "空欄の後",
    BlankNumberPosition::Before => "空欄の前",
    BlankNumberPosition::Above => "空欄の上",
  }
}

fn quiz_type_instructions(q: QuizType) -> &'static str {
  match q {
    QuizType::Descriptive =>
      "記述式問題のみを作成してください。各問題は、学習者が自分の言葉で回答できる形式にしてください。",
    QuizType::MultipleChoice =>
      "5肢択一問題のみを作成してください。各問題には1〜5の5つの選択肢を用意し、その中から正解を1つ選ぶ形式にしてください。",
    QuizType::Mixed =>
      "記述式問題と選択式問題を混合して作成してください。選択式問題には1〜5の5つの選択肢を用意してください。",
  }
}

/// Shared instruction block prepended to every prompt.
fn base_block(opts: &GenerationOptions) -> String {
  format!(
    "あなたは教育専門家です。教材作成のエキスパートとして、高品質な教育コンテンツを作成します。\n\
     重要: 必ず日本語のみで応答してください。英語や内部的な思考プロセスを含めないでください。直接日本語の教材コンテンツのみを出力してください。\n\
     教材の内容は元のテキストに基づいて作成し、事実の捏造や元のテキストと関係のない内容は含めないでください。\n\
     見出しはMarkdownの「#」「##」を、問題の列挙は番号付きリストを使用してください。\n\
     難易度の指針: {}",
    difficulty_guidance(opts.difficulty)
  )
}

/// Context block: the sampled source plus title/difficulty/subject and key terms.
fn context_block(source: &str, opts: &GenerationOptions) -> String {
  let mut out = format!(
    "テキスト:\n{}\n\nタイトル: {}\n難易度: {}\n科目領域: {}",
    source,
    opts.title,
    opts.difficulty.label_ja(),
    opts.subject_area
  );
  if !opts.key_terms.is_empty() {
    out.push_str(&format!("\n重要用語（必ず扱うこと）: {}", opts.key_terms.join("、")));
  }
  out
}

fn fill_in_blank_block(opts: &GenerationOptions) -> String {
  format!(
    "以下のテキストから穴埋め問題を作成してください。\n\
     重要な用語や概念を空欄にして、学習者が理解度を確認できるようにしてください。\n\
     \n\
     空欄の形式は次のように設定してください：\n\
     - 番号タイプ: {number_type}\n\
     - 番号位置: {position}\n\
     - 空欄スタイル: {style}\n\
     \n\
     例: {example}\n\
     \n\
     空欄の数: {count}箇所程度\n\
     \n\
     出力形式:\n\
     # [タイトル] - 穴埋めプリント\n\
     \n\
     以下の文章の空欄に適切な言葉を入れなさい。\n\
     \n\
     1. [穴埋め問題1]\n\
     2. [穴埋め問題2]\n\
     ...\n\
     \n\
     解答:\n\
     1. [解答1]\n\
     2. [解答2]\n\
     ...\n\
     \n\
     必ず指示された空欄の形式に従ってください。",
    number_type = blank_number_wording(opts.blank_number_type),
    position = blank_position_wording(opts.blank_number_position),
    style = blank_style_wording(opts.blank_style),
    example = blank_example(opts.blank_style, opts.blank_number_position),
    count = opts.question_count,
  )
}

fn summary_block(opts: &GenerationOptions) -> String {
  format!(
    "以下のテキストの重要なポイントをまとめたシートを作成してください。\n\
     見出しと箇条書きを使って、内容を整理してください。\n\
     \n\
     セクション数: {count}個\n\
     \n\
     出力形式:\n\
     # [タイトル] - まとめシート\n\
     \n\
     ## 1. [セクション1のタイトル]\n\
     - [ポイント1]\n\
     - [ポイント2]\n\
     ...\n\
     \n\
     ## 2. [セクション2のタイトル]\n\
     - [ポイント1]\n\
     - [ポイント2]\n\
     ...",
    count = opts.section_count,
  )
}

fn quiz_block(opts: &GenerationOptions) -> String {
  format!(
    "以下のテキストに基づいて、小テスト問題を作成してください。\n\
     {instructions}\n\
     \n\
     問題数: {count}問\n\
     \n\
     出力形式:\n\
     # [タイトル] - 小テスト\n\
     \n\
     以下の問題に答えなさい。\n\
     \n\
     ## 問1. [問題文]\n\
     [選択肢がある場合は1〜5で記載]\n\
     \n\
     ## 問2. [問題文]\n\
     ...\n\
     \n\
     解答:\n\
     1. [正解]\n\
     2. [正解]\n\
     ...",
    instructions = quiz_type_instructions(opts.quiz_type),
    count = opts.question_count,
  )
}

fn assignment_block(opts: &GenerationOptions) -> String {
  format!(
    "以下のテキストに基づいて、学習者向けの課題を作成してください。\n\
     各課題は元のテキストの理解を深める実践的な内容にし、取り組みの観点を1行添えてください。\n\
     \n\
     課題数: {count}個\n\
     \n\
     出力形式:\n\
     # [タイトル] - 課題\n\
     \n\
     以下の課題に取り組みなさい。\n\
     \n\
     1. [課題1の指示文]\n\
        観点: [評価の観点]\n\
     2. [課題2の指示文]\n\
        観点: [評価の観点]\n\
     ...",
    count = opts.assignment_count,
  )
}

fn flashcards_block(opts: &GenerationOptions) -> String {
  format!(
    "以下のテキストから、暗記学習用のフラッシュカードを作成してください。\n\
     表面は質問、裏面は簡潔な答えにしてください。\n\
     \n\
     カード数: {count}枚\n\
     \n\
     出力形式:\n\
     # [タイトル] - フラッシュカード\n\
     \n\
     1. [質問1]？\n\
        答え: [答え1]\n\
     2. [質問2]？\n\
        答え: [答え2]\n\
     ...",
    count = opts.card_count,
  )
}

fn other_block(label: &str) -> String {
  format!(
    "以下のテキストから{label}形式の教材を作成してください。\n\
     \n\
     出力形式:\n\
     # [タイトル]\n\
     \n\
     [教材本文]",
  )
}

/// Build the full instruction string for one generation call.
pub fn build_prompt(source: &str, material: &MaterialType, opts: &GenerationOptions) -> String {
  let type_block = match material {
    MaterialType::FillInBlank => fill_in_blank_block(opts),
    MaterialType::Summary => summary_block(opts),
    MaterialType::Quiz => quiz_block(opts),
    MaterialType::Assignment => assignment_block(opts),
    MaterialType::Flashcards => flashcards_block(opts),
    MaterialType::Other(label) => other_block(label),
  };
  format!("{}\n\n{}\n\n{}", base_block(opts), type_block, context_block(source, opts))
}

/// Append the validator's findings as a corrective instruction for the single
/// retry pass. Reasons are included verbatim.
pub fn corrective_prompt(prompt: &str, reasons: &[String]) -> String {
  let bullets: String = reasons.iter().map(|r| format!("- {r}\n")).collect();
  format!(
    "{prompt}\n\n前回の出力には以下の不備がありました。すべて修正し、完全な教材のみを出力してください:\n{bullets}"
  )
}

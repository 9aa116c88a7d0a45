//! Printable quote.
//!
//! The quote is first laid out as a list of styled lines by
//! [`quote_lines`], a pure function that tests can inspect, then drawn on A4
//! pages by [`render_quote`]. A new page starts whenever the next line would
//! cross the bottom margin.

use chrono::{DateTime, Utc};
use engine::{BudgetSnapshot, Customer, DiscountType};
use printpdf::{BuiltinFont, Mm, PdfDocument};

use crate::{CompanyProfile, DocumentError};

const PAGE_WIDTH: f32 = 210.0;
const PAGE_HEIGHT: f32 = 297.0;
const MARGIN: f32 = 20.0;

pub const NOT_INFORMED: &str = "Não informado";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LineStyle {
    Title,
    Heading,
    Body,
    Total,
    Footer,
    Blank,
}

impl LineStyle {
    fn font_size(self) -> f32 {
        match self {
            Self::Title => 20.0,
            Self::Heading => 12.0,
            Self::Body | Self::Blank => 10.0,
            Self::Total => 14.0,
            Self::Footer => 8.0,
        }
    }

    /// Vertical space taken by one line, in millimetres.
    fn line_height(self) -> f32 {
        match self {
            Self::Title => 12.0,
            Self::Heading => 8.0,
            Self::Body => 5.5,
            Self::Total => 9.0,
            Self::Footer => 4.5,
            Self::Blank => 4.0,
        }
    }

    /// Characters that fit between the margins at this size.
    fn wrap_width(self) -> usize {
        match self {
            Self::Title | Self::Total => 45,
            Self::Heading => 75,
            Self::Body | Self::Blank => 90,
            Self::Footer => 115,
        }
    }

    fn is_bold(self) -> bool {
        matches!(self, Self::Title | Self::Heading | Self::Total)
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PdfLine {
    pub style: LineStyle,
    pub text: String,
}

/// Splits `text` into lines of at most `width` characters, breaking on
/// whitespace when possible. Explicit newlines are kept.
pub fn wrap(text: &str, width: usize) -> Vec<String> {
    let mut out = Vec::new();
    for paragraph in text.lines() {
        let mut current = String::new();
        for word in paragraph.split_whitespace() {
            let mut word = word.to_string();
            while word.chars().count() > width {
                if !current.is_empty() {
                    out.push(std::mem::take(&mut current));
                }
                let head: String = word.chars().take(width).collect();
                word = word.chars().skip(width).collect();
                out.push(head);
            }
            let needed = current.chars().count() + usize::from(!current.is_empty()) + word.chars().count();
            if !current.is_empty() && needed > width {
                out.push(std::mem::take(&mut current));
            }
            if !current.is_empty() {
                current.push(' ');
            }
            current.push_str(&word);
        }
        if !current.is_empty() || paragraph.trim().is_empty() {
            out.push(current);
        }
    }
    if out.is_empty() {
        out.push(String::new());
    }
    out
}

struct Layout(Vec<PdfLine>);

impl Layout {
    fn push(&mut self, style: LineStyle, text: impl AsRef<str>) {
        for line in wrap(text.as_ref(), style.wrap_width()) {
            self.0.push(PdfLine { style, text: line });
        }
    }

    fn field(&mut self, label: &str, value: Option<&str>) {
        self.push(
            LineStyle::Body,
            format!("{label}: {}", value.unwrap_or(NOT_INFORMED)),
        );
    }

    fn blank(&mut self) {
        self.0.push(PdfLine {
            style: LineStyle::Blank,
            text: String::new(),
        });
    }
}

fn customer_section(layout: &mut Layout, customer: Option<&Customer>) {
    layout.push(LineStyle::Heading, "DADOS DO CLIENTE");
    layout.field("Nome", customer.map(|c| c.name.as_str()));

    let tax_id = customer.and_then(|c| c.tax_id.as_ref());
    let label = tax_id.map_or("CPF/CNPJ", |t| t.person_type().tax_id_label());
    layout.field(label, tax_id.map(ToString::to_string).as_deref());

    layout.field("Email", customer.and_then(|c| c.email.as_deref()));
    layout.field("Telefone", customer.and_then(|c| c.phone.as_deref()));
    layout.field(
        "Endereço",
        customer.and_then(|c| c.address.one_line()).as_deref(),
    );
}

/// Lays out the quote for `snapshot` as issued by `company` at
/// `generated_at`.
pub fn quote_lines(
    company: &CompanyProfile,
    snapshot: &BudgetSnapshot,
    generated_at: DateTime<Utc>,
) -> Vec<PdfLine> {
    let budget = &snapshot.budget;
    let mut layout = Layout(Vec::new());

    layout.push(LineStyle::Title, "ORÇAMENTO");
    layout.blank();

    layout.push(LineStyle::Heading, &company.name);
    if let Some(tax_id) = &company.tax_id {
        layout.push(LineStyle::Body, format!("CNPJ: {tax_id}"));
    }
    if let Some(phone) = &company.phone {
        layout.push(LineStyle::Body, format!("Telefone: {phone}"));
    }
    if let Some(email) = &company.email {
        layout.push(LineStyle::Body, format!("Email: {email}"));
    }
    if let Some(address) = &company.address {
        layout.push(LineStyle::Body, format!("Endereço: {address}"));
    }
    layout.blank();

    customer_section(&mut layout, snapshot.customer.as_ref());
    layout.blank();

    layout.push(LineStyle::Heading, "DETALHES DO ORÇAMENTO");
    layout.push(LineStyle::Body, format!("Número: {}", budget.number));
    layout.push(LineStyle::Body, format!("Título: {}", budget.title));
    layout.push(
        LineStyle::Body,
        format!("Data: {}", company.format_datetime(budget.created_at)),
    );
    layout.push(
        LineStyle::Body,
        format!("Status: {}", budget.status.label().to_uppercase()),
    );
    layout.blank();

    layout.push(LineStyle::Heading, "DESCRIÇÃO");
    let text = &budget.text;
    if text.is_empty() {
        layout.push(LineStyle::Body, "Sem descrição.");
    }
    for (label, value) in [
        ("Projeto", &text.project_name),
        ("Detalhes", &text.details),
        ("Condições de pagamento", &text.payment_terms),
        ("Prazo de entrega", &text.delivery_deadline),
        ("Observações", &text.observations),
    ] {
        if let Some(value) = value {
            layout.push(LineStyle::Body, format!("{label}: {value}"));
        }
    }
    layout.blank();

    layout.push(LineStyle::Body, format!("Subtotal: {}", budget.subtotal));
    match (budget.discount_type, budget.discount_percent, budget.discount_amount) {
        (Some(DiscountType::Amount), _, Some(amount)) | (None, None, Some(amount)) => {
            layout.push(LineStyle::Body, format!("Desconto: {amount}"));
        }
        (_, Some(percent), _) if percent > 0.0 => {
            layout.push(LineStyle::Body, format!("Desconto: {percent}%"));
        }
        _ => {}
    }
    layout.push(
        LineStyle::Total,
        format!("Valor Total: {}", budget.final_amount),
    );
    layout.blank();

    layout.push(
        LineStyle::Footer,
        format!(
            "Gerado em {} | {}",
            company.format_timestamp(generated_at),
            company.name
        ),
    );

    layout.0
}

/// Renders the quote to PDF bytes.
pub fn render_quote(
    company: &CompanyProfile,
    snapshot: &BudgetSnapshot,
    generated_at: DateTime<Utc>,
) -> Result<Vec<u8>, DocumentError> {
    let lines = quote_lines(company, snapshot, generated_at);
    let title = format!("Orçamento {}", snapshot.budget.number);

    let (doc, page, layer) = PdfDocument::new(
        title,
        Mm(PAGE_WIDTH),
        Mm(PAGE_HEIGHT),
        "Layer 1",
    );
    let regular = doc
        .add_builtin_font(BuiltinFont::Helvetica)
        .map_err(|e| DocumentError::Pdf(e.to_string()))?;
    let bold = doc
        .add_builtin_font(BuiltinFont::HelveticaBold)
        .map_err(|e| DocumentError::Pdf(e.to_string()))?;

    let mut current = doc.get_page(page).get_layer(layer);
    let mut y = PAGE_HEIGHT - MARGIN;

    for line in lines {
        let height = line.style.line_height();
        if y - height < MARGIN {
            let (page, layer) = doc.add_page(Mm(PAGE_WIDTH), Mm(PAGE_HEIGHT), "Layer 1");
            current = doc.get_page(page).get_layer(layer);
            y = PAGE_HEIGHT - MARGIN;
        }
        y -= height;
        if line.text.is_empty() {
            continue;
        }
        let font = if line.style.is_bold() { &bold } else { &regular };
        current.use_text(line.text, line.style.font_size(), Mm(MARGIN), Mm(y), font);
    }

    doc.save_to_bytes()
        .map_err(|e| DocumentError::Pdf(e.to_string()))
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;
    use engine::{
        Address, Budget, BudgetNumber, BudgetStatus, BudgetText, MoneyCents, PersonType, TaxId,
    };
    use uuid::Uuid;

    use super::*;

    fn created() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, 15, 13, 0, 0).unwrap()
    }

    fn snapshot(customer: Option<Customer>, text: BudgetText) -> BudgetSnapshot {
        BudgetSnapshot {
            budget: Budget {
                id: Uuid::new_v4(),
                number: BudgetNumber::new(2026, 1).unwrap(),
                title: "Cabinet".to_string(),
                customer_id: customer.as_ref().map(|c| c.id),
                subtotal: MoneyCents::new(100_000),
                discount_percent: Some(10.0),
                discount_amount: None,
                discount_type: Some(DiscountType::Percentage),
                final_amount: MoneyCents::new(90_000),
                text,
                status: BudgetStatus::Draft,
                created_at: created(),
            },
            customer,
        }
    }

    fn ana() -> Customer {
        Customer {
            id: Uuid::new_v4(),
            name: "Ana".to_string(),
            person_type: Some(PersonType::Individual),
            tax_id: Some(TaxId::parse("11144477735", PersonType::Individual).unwrap()),
            phone: None,
            email: Some("ana@example.com".to_string()),
            address: Address {
                city: Some("Curitiba".to_string()),
                state: Some("PR".to_string()),
                ..Default::default()
            },
            notes: None,
            created_at: created(),
        }
    }

    fn texts(lines: &[PdfLine]) -> Vec<&str> {
        lines.iter().map(|l| l.text.as_str()).collect()
    }

    #[test]
    fn quote_has_all_sections_and_total() {
        let lines = quote_lines(
            &CompanyProfile::default(),
            &snapshot(Some(ana()), BudgetText::default()),
            created(),
        );
        let texts = texts(&lines);

        for expected in [
            "ORÇAMENTO",
            "Marcenaria MDF",
            "DADOS DO CLIENTE",
            "Nome: Ana",
            "CPF: 111.444.777-35",
            "Telefone: Não informado",
            "Endereço: Curitiba/PR",
            "DETALHES DO ORÇAMENTO",
            "Número: 2026-001",
            "Data: 15/03/2026 10:00",
            "Status: RASCUNHO",
            "DESCRIÇÃO",
            "Subtotal: R$ 1000.00",
            "Desconto: 10%",
            "Valor Total: R$ 900.00",
        ] {
            assert!(texts.contains(&expected), "missing {expected:?} in {texts:?}");
        }
        let total = lines
            .iter()
            .find(|l| l.style == LineStyle::Total)
            .unwrap();
        assert_eq!(total.text, "Valor Total: R$ 900.00");
    }

    #[test]
    fn missing_customer_renders_placeholders() {
        let lines = quote_lines(
            &CompanyProfile::default(),
            &snapshot(None, BudgetText::default()),
            created(),
        );
        let texts = texts(&lines);
        assert!(texts.contains(&"Nome: Não informado"));
        assert!(texts.contains(&"CPF/CNPJ: Não informado"));
        assert!(texts.contains(&"Sem descrição."));
    }

    #[test]
    fn long_text_wraps_and_paginates() {
        let details = "MDF ".repeat(2_000);
        let text = BudgetText {
            details: Some(details),
            ..Default::default()
        };
        let snapshot = snapshot(None, text);
        let lines = quote_lines(&CompanyProfile::default(), &snapshot, created());
        assert!(lines.iter().all(|l| l.text.chars().count() <= 115));
        assert!(lines.len() > 60);

        let bytes = render_quote(&CompanyProfile::default(), &snapshot, created()).unwrap();
        assert!(bytes.starts_with(b"%PDF"));
    }

    #[test]
    fn wrap_breaks_on_words_and_long_tokens() {
        assert_eq!(wrap("aa bb cc", 5), vec!["aa bb", "cc"]);
        assert_eq!(wrap("abcdefgh", 3), vec!["abc", "def", "gh"]);
        assert_eq!(wrap("one\n\ntwo", 10), vec!["one", "", "two"]);
        assert_eq!(wrap("", 10), vec![""]);
    }
}

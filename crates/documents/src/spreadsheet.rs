//! xlsx exports: customers, budgets and the monthly report.

use std::collections::HashMap;

use engine::{Budget, Customer, DiscountType};
use rust_xlsxwriter::{Color, Format, FormatAlign, FormatBorder, Workbook, Worksheet};
use uuid::Uuid;

use crate::{CompanyProfile, DocumentError, MonthlySummary};

const CUSTOMER_HEADERS: [(&str, f64); 7] = [
    ("ID", 38.0),
    ("Nome", 28.0),
    ("CPF/CNPJ", 20.0),
    ("Email", 30.0),
    ("Telefone", 18.0),
    ("Cidade", 20.0),
    ("Data de Cadastro", 18.0),
];

const BUDGET_HEADERS: [(&str, f64); 9] = [
    ("Número", 12.0),
    ("Título", 28.0),
    ("Cliente", 25.0),
    ("Subtotal", 15.0),
    ("Desconto (%)", 14.0),
    ("Desconto (R$)", 14.0),
    ("Total Final", 15.0),
    ("Status", 12.0),
    ("Data", 18.0),
];

fn header_format() -> Format {
    Format::new()
        .set_bold()
        .set_font_color(Color::White)
        .set_background_color(Color::RGB(0x1F2937))
        .set_align(FormatAlign::Center)
        .set_align(FormatAlign::VerticalCenter)
        .set_border(FormatBorder::Thin)
}

fn cell_format() -> Format {
    Format::new().set_border(FormatBorder::Thin)
}

fn money_format() -> Format {
    Format::new()
        .set_border(FormatBorder::Thin)
        .set_num_format("\"R$\" #,##0.00")
}

fn write_headers(sheet: &mut Worksheet, headers: &[(&str, f64)]) -> Result<(), DocumentError> {
    let format = header_format();
    for (col, (title, width)) in (0u16..).zip(headers) {
        sheet.write_string_with_format(0, col, *title, &format)?;
        sheet.set_column_width(col, *width)?;
    }
    Ok(())
}

fn opt_str(value: Option<&str>) -> &str {
    value.unwrap_or("")
}

/// Workbook with one "Clientes" sheet.
pub fn customers_workbook(
    customers: &[Customer],
    company: &CompanyProfile,
) -> Result<Vec<u8>, DocumentError> {
    let mut workbook = Workbook::new();
    let sheet = workbook.add_worksheet();
    sheet.set_name("Clientes")?;
    write_headers(sheet, &CUSTOMER_HEADERS)?;

    let cell = cell_format();
    for (row, customer) in (1u32..).zip(customers) {
        let tax_id = customer.tax_id.as_ref().map(ToString::to_string);
        let values = [
            customer.id.to_string(),
            customer.name.clone(),
            tax_id.unwrap_or_default(),
            opt_str(customer.email.as_deref()).to_string(),
            opt_str(customer.phone.as_deref()).to_string(),
            opt_str(customer.address.city.as_deref()).to_string(),
            company.format_datetime(customer.created_at),
        ];
        for (col, value) in (0u16..).zip(values) {
            sheet.write_string_with_format(row, col, value, &cell)?;
        }
    }

    Ok(workbook.save_to_buffer()?)
}

fn write_budget_rows(
    sheet: &mut Worksheet,
    budgets: &[Budget],
    customers: &[Customer],
    company: &CompanyProfile,
) -> Result<(), DocumentError> {
    let names: HashMap<Uuid, &str> = customers
        .iter()
        .map(|c| (c.id, c.name.as_str()))
        .collect();
    let cell = cell_format();
    let money = money_format();

    write_headers(sheet, &BUDGET_HEADERS)?;
    for (row, budget) in (1u32..).zip(budgets) {
        let customer = budget
            .customer_id
            .and_then(|id| names.get(&id).copied())
            .unwrap_or("-");

        sheet.write_string_with_format(row, 0, budget.number.to_string(), &cell)?;
        sheet.write_string_with_format(row, 1, &budget.title, &cell)?;
        sheet.write_string_with_format(row, 2, customer, &cell)?;
        sheet.write_number_with_format(row, 3, budget.subtotal.to_major(), &money)?;
        match budget.discount_percent {
            Some(percent) if budget.discount_type != Some(DiscountType::Amount) => {
                sheet.write_number_with_format(row, 4, percent, &cell)?;
            }
            _ => {
                sheet.write_blank(row, 4, &cell)?;
            }
        }
        match budget.discount_amount {
            Some(amount) if budget.discount_type != Some(DiscountType::Percentage) => {
                sheet.write_number_with_format(row, 5, amount.to_major(), &money)?;
            }
            _ => {
                sheet.write_blank(row, 5, &money)?;
            }
        }
        sheet.write_number_with_format(row, 6, budget.final_amount.to_major(), &money)?;
        sheet.write_string_with_format(row, 7, budget.status.label().to_uppercase(), &cell)?;
        sheet.write_string_with_format(row, 8, company.format_datetime(budget.created_at), &cell)?;
    }
    Ok(())
}

/// Workbook with one "Orçamentos" sheet. Customer names are resolved from
/// `customers`; unknown or missing links show `-`.
pub fn budgets_workbook(
    budgets: &[Budget],
    customers: &[Customer],
    company: &CompanyProfile,
) -> Result<Vec<u8>, DocumentError> {
    let mut workbook = Workbook::new();
    let sheet = workbook.add_worksheet();
    sheet.set_name("Orçamentos")?;
    write_budget_rows(sheet, budgets, customers, company)?;

    Ok(workbook.save_to_buffer()?)
}

/// Rows of the "Análise" sheet, in order.
pub fn analysis_rows(summary: &MonthlySummary) -> Vec<(&'static str, String)> {
    vec![
        ("Total de Orçamentos", summary.total.to_string()),
        ("Orçamentos Aprovados", summary.approved.to_string()),
        ("Orçamentos em Rascunho", summary.draft.to_string()),
        ("Orçamentos Rejeitados", summary.rejected.to_string()),
        ("Faturamento Total", summary.revenue.to_string()),
        ("Ticket Médio", summary.average_ticket.to_string()),
    ]
}

/// Monthly report: the month's budgets plus an "Análise" sheet with the
/// figures of [`MonthlySummary`].
pub fn monthly_report_workbook(
    budgets: &[Budget],
    customers: &[Customer],
    company: &CompanyProfile,
) -> Result<Vec<u8>, DocumentError> {
    let summary = MonthlySummary::from_budgets(budgets);
    let mut workbook = Workbook::new();

    let sheet = workbook.add_worksheet();
    sheet.set_name("Orçamentos")?;
    write_budget_rows(sheet, budgets, customers, company)?;

    let sheet = workbook.add_worksheet();
    sheet.set_name("Análise")?;
    write_headers(sheet, &[("Métrica", 30.0), ("Valor", 20.0)])?;
    let cell = cell_format();
    for (row, (metric, value)) in (1u32..).zip(analysis_rows(&summary)) {
        sheet.write_string_with_format(row, 0, metric, &cell)?;
        sheet.write_string_with_format(row, 1, value, &cell)?;
    }

    Ok(workbook.save_to_buffer()?)
}

#[cfg(test)]
mod tests {
    use chrono::Utc;
    use engine::{Address, BudgetNumber, BudgetStatus, BudgetText, MoneyCents};

    use super::*;

    fn customer(name: &str) -> Customer {
        Customer {
            id: Uuid::new_v4(),
            name: name.to_string(),
            person_type: None,
            tax_id: None,
            phone: Some("41 99999-0000".to_string()),
            email: None,
            address: Address::default(),
            notes: None,
            created_at: Utc::now(),
        }
    }

    fn budget(seq: u32, customer_id: Option<Uuid>, status: BudgetStatus) -> Budget {
        Budget {
            id: Uuid::new_v4(),
            number: BudgetNumber::new(2026, seq).unwrap(),
            title: "Cabinet".to_string(),
            customer_id,
            subtotal: MoneyCents::new(100_000),
            discount_percent: Some(10.0),
            discount_amount: None,
            discount_type: Some(DiscountType::Percentage),
            final_amount: MoneyCents::new(90_000),
            text: BudgetText::default(),
            status,
            created_at: Utc::now(),
        }
    }

    fn is_zip(bytes: &[u8]) -> bool {
        bytes.starts_with(b"PK")
    }

    #[test]
    fn exports_produce_xlsx_files() {
        let company = CompanyProfile::default();
        let ana = customer("Ana");
        let budgets = vec![
            budget(1, Some(ana.id), BudgetStatus::Approved),
            budget(2, Some(Uuid::new_v4()), BudgetStatus::Draft),
            budget(3, None, BudgetStatus::Rejected),
        ];
        let customers = vec![ana];

        assert!(is_zip(&customers_workbook(&customers, &company).unwrap()));
        assert!(is_zip(&budgets_workbook(&budgets, &customers, &company).unwrap()));
        assert!(is_zip(
            &monthly_report_workbook(&budgets, &customers, &company).unwrap()
        ));
    }

    #[test]
    fn analysis_rows_follow_summary() {
        let budgets = vec![
            budget(1, None, BudgetStatus::Approved),
            budget(2, None, BudgetStatus::Draft),
        ];
        let rows = analysis_rows(&MonthlySummary::from_budgets(&budgets));
        assert_eq!(rows[0], ("Total de Orçamentos", "2".to_string()));
        assert_eq!(rows[1], ("Orçamentos Aprovados", "1".to_string()));
        assert_eq!(rows[4], ("Faturamento Total", "R$ 1800.00".to_string()));
        assert_eq!(rows[5], ("Ticket Médio", "R$ 900.00".to_string()));
    }
}

//! WhatsApp deep links (`wa.me`) carrying a budget summary.

use chrono::{DateTime, Utc};
use engine::BudgetSnapshot;

use crate::{CompanyProfile, DocumentError};

const COUNTRY_CODE: &str = "55";

/// A ready to open `wa.me` link.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct WhatsAppMessage {
    /// National number, digits only (DDD + subscriber).
    pub phone: String,
    pub text: String,
    pub link: String,
}

/// Reduces `raw` to its national digits.
///
/// Spaces, dashes, parentheses and `+` are dropped. A leading `55` is taken
/// as the country code only when the number is too long to be national.
pub fn normalize_phone(raw: &str) -> Result<String, DocumentError> {
    let cleaned: String = raw
        .chars()
        .filter(|c| !matches!(c, ' ' | '-' | '(' | ')' | '+'))
        .collect();
    if cleaned.is_empty() || !cleaned.chars().all(|c| c.is_ascii_digit()) {
        return Err(DocumentError::InvalidDestination(
            "phone must contain only digits".to_string(),
        ));
    }

    let national = match cleaned.strip_prefix(COUNTRY_CODE) {
        Some(rest) if cleaned.len() > 11 => rest,
        _ => cleaned.as_str(),
    };
    if !(10..=11).contains(&national.len()) {
        return Err(DocumentError::InvalidDestination(
            "phone must have 10 or 11 digits".to_string(),
        ));
    }
    Ok(national.to_string())
}

pub fn budget_message(
    company: &CompanyProfile,
    snapshot: &BudgetSnapshot,
    now: DateTime<Utc>,
) -> String {
    let budget = &snapshot.budget;
    let customer = snapshot
        .customer
        .as_ref()
        .map_or("cliente", |c| c.name.as_str());

    format!(
        "Olá {customer}! 👋\n\
         \n\
         Você recebeu um novo *orçamento* de {company}! 🎉\n\
         \n\
         📋 *Detalhes do Orçamento:*\n\
         • Número: {number}\n\
         • Título: {title}\n\
         • Valor Total: {total}\n\
         • Data: {date}\n\
         \n\
         Para mais informações ou dúvidas, entre em contato conosco!\n\
         \n\
         Obrigado! 😊",
        company = company.name,
        number = budget.number,
        title = budget.title,
        total = budget.final_amount,
        date = company.format_timestamp(now),
    )
}

/// Builds the link that opens a chat with the budget's customer.
///
/// Fails with [`DocumentError::InvalidDestination`] when the budget has no
/// customer, the customer has no phone, or the phone is not a valid
/// Brazilian number.
pub fn budget_whatsapp(
    company: &CompanyProfile,
    snapshot: &BudgetSnapshot,
    now: DateTime<Utc>,
) -> Result<WhatsAppMessage, DocumentError> {
    let customer = snapshot.customer.as_ref().ok_or_else(|| {
        DocumentError::InvalidDestination("budget has no customer".to_string())
    })?;
    let raw = customer.phone.as_deref().ok_or_else(|| {
        DocumentError::InvalidDestination("customer has no phone".to_string())
    })?;
    let phone = normalize_phone(raw)?;

    let text = budget_message(company, snapshot, now);
    let link = format!(
        "https://wa.me/{COUNTRY_CODE}{phone}?text={}",
        urlencoding::encode(&text)
    );
    Ok(WhatsAppMessage { phone, text, link })
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;
    use engine::{
        Address, Budget, BudgetNumber, BudgetStatus, BudgetText, Customer, MoneyCents,
    };
    use uuid::Uuid;

    use super::*;

    fn snapshot(phone: Option<&str>) -> BudgetSnapshot {
        let now = Utc.with_ymd_and_hms(2026, 3, 15, 13, 0, 0).unwrap();
        let customer = Customer {
            id: Uuid::new_v4(),
            name: "Ana".to_string(),
            person_type: None,
            tax_id: None,
            phone: phone.map(ToString::to_string),
            email: None,
            address: Address::default(),
            notes: None,
            created_at: now,
        };
        BudgetSnapshot {
            budget: Budget {
                id: Uuid::new_v4(),
                number: BudgetNumber::new(2026, 7).unwrap(),
                title: "Cabinet".to_string(),
                customer_id: Some(customer.id),
                subtotal: MoneyCents::new(100_000),
                discount_percent: None,
                discount_amount: None,
                discount_type: None,
                final_amount: MoneyCents::new(90_000),
                text: BudgetText::default(),
                status: BudgetStatus::Draft,
                created_at: now,
            },
            customer: Some(customer),
        }
    }

    #[test]
    fn phone_normalization() {
        assert_eq!(normalize_phone("(41) 99999-0000").unwrap(), "41999990000");
        assert_eq!(normalize_phone("+55 41 99999-0000").unwrap(), "41999990000");
        assert_eq!(normalize_phone("4133334444").unwrap(), "4133334444");
        // 11 digits starting with 55 is a national number (DDD 55).
        assert_eq!(normalize_phone("55999990000").unwrap(), "55999990000");

        for bad in ["", "123", "41 9999-00001234", "41 abc 0000", "+55 41 999"] {
            assert!(
                matches!(normalize_phone(bad), Err(DocumentError::InvalidDestination(_))),
                "{bad}"
            );
        }
    }

    #[test]
    fn link_carries_encoded_message() {
        let now = Utc.with_ymd_and_hms(2026, 3, 15, 13, 0, 0).unwrap();
        let message =
            budget_whatsapp(&CompanyProfile::default(), &snapshot(Some("41 99999-0000")), now)
                .unwrap();

        assert!(message.text.starts_with("Olá Ana!"));
        assert!(message.text.contains("• Número: 2026-007"));
        assert!(message.text.contains("• Valor Total: R$ 900.00"));
        assert!(message.text.contains("• Data: 15/03/2026 às 10:00"));
        assert!(
            message
                .link
                .starts_with("https://wa.me/5541999990000?text=Ol%C3%A1%20Ana%21")
        );
        assert!(!message.link.contains(' '));
    }

    #[test]
    fn missing_phone_is_invalid_destination() {
        let now = Utc::now();
        let err = budget_whatsapp(&CompanyProfile::default(), &snapshot(None), now).unwrap_err();
        assert!(matches!(err, DocumentError::InvalidDestination(_)));

        let mut no_customer = snapshot(Some("41999990000"));
        no_customer.customer = None;
        let err = budget_whatsapp(&CompanyProfile::default(), &no_customer, now).unwrap_err();
        assert!(matches!(err, DocumentError::InvalidDestination(_)));
    }
}

//! Marketplace classification.
//!
//! A fixed rule table maps (order state text, payment method text) to a (marketplace, subtype)
//! pair. Rules are evaluated top to bottom and the first match wins; matching is case-insensitive
//! substring containment after trimming, with null inputs treated as empty text.

/// The sentinel returned when no rule matches.
pub const UNKNOWN: (&str, &str) = ("?", "?");

/// Derives the marketplace labels for one order.
///
/// The rule order is part of the contract: the Prime check on the order state runs before any of
/// the payment-gateway checks, so a Prime order paid through a marketplace gateway still
/// classifies as Amazon PRIME.
pub fn classify(state_name: Option<&str>, payment: Option<&str>) -> (&'static str, &'static str) {
    let state = state_name.unwrap_or("").trim().to_lowercase();
    let pay = payment.unwrap_or("").trim().to_lowercase();
    if state.contains("amazon prime") || state.contains("prime") {
        return ("Amazon", "PRIME");
    }
    if pay.contains("waadby payment") {
        return ("Amazon", "Estandar");
    }
    if pay.contains("bricodepot") {
        return ("BricoDepot", "Estandar");
    }
    if pay.contains("conforama") {
        return ("Conforama", "Estandar");
    }
    if pay.contains("manomano") {
        return ("ManoMano", "Estandar");
    }
    if pay.contains("leroymerlin") {
        return ("Leroy Merlin", "Estandar");
    }
    UNKNOWN
}

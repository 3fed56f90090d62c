use super::error::ValidationError;
use crate::core::models::element::Element;
use crate::core::potential::model::NetCharge;
use phf::{Set, phf_set};
use std::collections::BTreeSet;
use std::ops::RangeInclusive;

static AIMNET2_ELEMENTS: Set<&'static str> = phf_set! {
    "H", "B", "C", "N", "O", "F", "Si", "P", "S", "Cl", "As", "Se", "Br", "I",
};

/// The elements and net charges a model family was trained for.
#[derive(Debug, Clone)]
pub struct SupportDomain {
    name: &'static str,
    elements: &'static Set<&'static str>,
    charges: RangeInclusive<NetCharge>,
}

impl SupportDomain {
    /// The AIMNet2 family: H B C N O F Si P S Cl As Se Br I, net charge −2..=2.
    pub fn aimnet2() -> Self {
        Self {
            name: "aimnet2",
            elements: &AIMNET2_ELEMENTS,
            charges: -2..=2,
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn supports_element(&self, element: Element) -> bool {
        self.elements.contains(element.symbol())
    }

    /// The domain's elements in order of atomic number.
    pub fn elements(&self) -> Vec<Element> {
        let mut elements: Vec<Element> = self
            .elements
            .iter()
            .filter_map(|symbol| Element::from_symbol(symbol).ok())
            .collect();
        elements.sort();
        elements
    }

    pub fn supports_charge(&self, charge: NetCharge) -> bool {
        self.charges.contains(&charge)
    }

    pub fn allowed_charges(&self) -> Vec<NetCharge> {
        self.charges.clone().collect()
    }

    /// Checks a request against the domain.
    ///
    /// Elements are checked before the charge; every offending element is
    /// reported at once.
    pub fn validate<I>(&self, elements: I, charge: NetCharge) -> Result<(), ValidationError>
    where
        I: IntoIterator<Item = Element>,
    {
        let unsupported: BTreeSet<Element> = elements
            .into_iter()
            .filter(|e| !self.supports_element(*e))
            .collect();
        if !unsupported.is_empty() {
            return Err(ValidationError::UnsupportedElement {
                domain: self.name,
                elements: unsupported,
            });
        }
        if !self.supports_charge(charge) {
            return Err(ValidationError::UnsupportedCharge {
                domain: self.name,
                charge,
                allowed: self.allowed_charges(),
            });
        }
        Ok(())
    }
}

/// Free-function form of [`SupportDomain::validate`].
pub fn validate<I>(elements: I, charge: NetCharge, domain: &SupportDomain) -> Result<(), ValidationError>
where
    I: IntoIterator<Item = Element>,
{
    domain.validate(elements, charge)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn elements(symbols: &[&str]) -> Vec<Element> {
        symbols
            .iter()
            .map(|s| Element::from_symbol(s).unwrap())
            .collect()
    }

    #[test]
    fn domain_elements_are_listed_by_atomic_number() {
        let listed = SupportDomain::aimnet2().elements();
        assert_eq!(listed.len(), 14);
        assert_eq!(listed.first(), Some(&Element::H));
        assert_eq!(listed.last().map(|e| e.symbol()), Some("I"));
        assert!(listed.windows(2).all(|w| w[0].atomic_number() < w[1].atomic_number()));
    }

    #[test]
    fn accepts_any_subset_of_the_domain() {
        let domain = SupportDomain::aimnet2();
        assert!(validate(elements(&["C", "H", "O", "H"]), 0, &domain).is_ok());
        assert!(validate(elements(&["Si", "Cl", "I", "Se", "As"]), -2, &domain).is_ok());
        assert!(validate(elements(&["Br"]), 2, &domain).is_ok());
    }

    #[test]
    fn reports_exact_set_difference_of_unsupported_elements() {
        let domain = SupportDomain::aimnet2();
        let err = validate(elements(&["C", "Fe", "H", "Na", "Fe", "U"]), 0, &domain).unwrap_err();
        match err {
            ValidationError::UnsupportedElement { domain, elements: found } => {
                assert_eq!(domain, "aimnet2");
                let expected: BTreeSet<_> = elements(&["Na", "Fe", "U"]).into_iter().collect();
                assert_eq!(found, expected);
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn rejects_charge_outside_allowed_range() {
        let domain = SupportDomain::aimnet2();
        for charge in [-3, 3, 5] {
            let err = validate(elements(&["H", "H"]), charge, &domain).unwrap_err();
            assert_eq!(
                err,
                ValidationError::UnsupportedCharge {
                    domain: "aimnet2",
                    charge,
                    allowed: vec![-2, -1, 0, 1, 2],
                }
            );
        }
    }

    #[test]
    fn element_check_precedes_charge_check() {
        let domain = SupportDomain::aimnet2();
        let err = validate(elements(&["Fe"]), 7, &domain).unwrap_err();
        assert!(matches!(err, ValidationError::UnsupportedElement { .. }));
    }
}

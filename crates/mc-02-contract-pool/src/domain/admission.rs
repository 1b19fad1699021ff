//! # Contract Admission Policy
//!
//! Market-specific rules gating whether a contract may be persisted or
//! mined. Checked on every incoming contract (preliminary pass, against
//! pool plus persisted state) and again when the producer selects
//! contracts for a block (against chain-confirmed state plus the block
//! under construction), because two peers can race conflicting contracts
//! before either is chained.

use super::errors::AdmissionError;
use super::pool::PendingPool;
use shared_types::documents::Document;
use shared_types::entities::{Contract, ContractType, Hash};
use shared_types::LedgerStore;
use std::collections::HashSet;

/// Stateless policy object; all state lives in the pool and the store.
#[derive(Debug, Default, Clone, Copy)]
pub struct AdmissionPolicy;

impl AdmissionPolicy {
    /// Preliminary pass on an incoming contract.
    ///
    /// `check_parent` can be switched off when full chain context is not
    /// yet available; the double-spend and overspend rules always run.
    pub fn admit_pending(
        &self,
        candidate: &Contract,
        pool: &PendingPool,
        store: &dyn LedgerStore,
        check_parent: bool,
    ) -> Result<(), AdmissionError> {
        let parent = candidate.previous_id()?;

        if check_parent {
            if let Some(parent) = parent {
                let known = pool.contains(&parent) || store.get_contract(&parent)?.is_some();
                if !known {
                    return Err(AdmissionError::UnknownParent(parent));
                }
            }
        }

        match candidate.contract_type {
            ContractType::Transfer => {
                if let Some(parent) = parent {
                    let siblings = self.known_matching(pool, store, &|c: &Contract| {
                        c.contract_type == ContractType::Transfer
                            && c.previous_hash == candidate.previous_hash
                    })?;
                    if siblings.iter().any(|c| c.id() != candidate.id()) {
                        return Err(AdmissionError::DoubleSpend(parent));
                    }
                }
                Ok(())
            }
            ContractType::Investment => {
                let mortgage_id = parent.ok_or(AdmissionError::MissingMortgageParent)?;
                let mortgage = pool
                    .get(&mortgage_id)
                    .cloned()
                    .or(store.get_contract(&mortgage_id)?);
                let siblings = self.known_matching(pool, store, &|c: &Contract| {
                    c.contract_type == ContractType::Investment
                        && c.previous_hash == candidate.previous_hash
                })?;
                self.check_overspend(candidate, mortgage_id, mortgage, &siblings, check_parent)
            }
            ContractType::Mortgage => Ok(()),
        }
    }

    /// Block-admission pass: only chain-confirmed state counts, plus the
    /// contracts already selected into the block under construction.
    pub fn admit_for_block(
        &self,
        candidate: &Contract,
        selected: &[Contract],
        store: &dyn LedgerStore,
    ) -> Result<(), AdmissionError> {
        let parent = candidate.previous_id()?;

        if let Some(parent) = parent {
            let in_block = selected.iter().any(|c| c.id() == parent);
            if !in_block && !store.contract_on_blockchain(&parent)? {
                return Err(AdmissionError::UnknownParent(parent));
            }
        }

        match candidate.contract_type {
            ContractType::Transfer => {
                if let Some(parent) = parent {
                    let conflict = self
                        .chained_matching(store, &|c: &Contract| {
                            c.contract_type == ContractType::Transfer
                                && c.previous_hash == candidate.previous_hash
                        })?
                        .into_iter()
                        .chain(selected.iter().cloned().filter(|c| {
                            c.contract_type == ContractType::Transfer
                                && c.previous_hash == candidate.previous_hash
                        }))
                        .any(|c| c.id() != candidate.id());
                    if conflict {
                        return Err(AdmissionError::DoubleSpend(parent));
                    }
                }
                Ok(())
            }
            ContractType::Investment => {
                let mortgage_id = parent.ok_or(AdmissionError::MissingMortgageParent)?;
                let mortgage = selected
                    .iter()
                    .find(|c| c.id() == mortgage_id)
                    .cloned()
                    .or(store.get_contract(&mortgage_id)?);

                let mut siblings = self.chained_matching(store, &|c: &Contract| {
                    c.contract_type == ContractType::Investment
                        && c.previous_hash == candidate.previous_hash
                })?;
                siblings.extend(selected.iter().cloned().filter(|c| {
                    c.contract_type == ContractType::Investment
                        && c.previous_hash == candidate.previous_hash
                }));

                self.check_overspend(candidate, mortgage_id, mortgage, &siblings, true)
            }
            ContractType::Mortgage => Ok(()),
        }
    }

    /// Sum investment amounts descending from one mortgage, candidate
    /// included, and reject strictly-greater-than-financeable totals.
    fn check_overspend(
        &self,
        candidate: &Contract,
        mortgage_id: Hash,
        mortgage: Option<Contract>,
        siblings: &[Contract],
        parent_required: bool,
    ) -> Result<(), AdmissionError> {
        let Some(mortgage) = mortgage else {
            // Without the mortgage the sum has no ceiling to check
            // against; the parent-existence rule already decided whether
            // that is acceptable.
            return if parent_required {
                Err(AdmissionError::UnknownParent(mortgage_id))
            } else {
                Ok(())
            };
        };

        if mortgage.contract_type != ContractType::Mortgage {
            return Err(AdmissionError::NotAMortgage(mortgage_id));
        }
        let Document::Mortgage(terms) =
            Document::decode(mortgage.contract_type, &mortgage.document)
                .map_err(|_| AdmissionError::BadDocument)?
        else {
            return Err(AdmissionError::BadDocument);
        };

        let mut total = invested_amount(candidate)?;
        let mut seen: HashSet<Hash> = HashSet::from([candidate.id()]);
        for sibling in siblings {
            if !seen.insert(sibling.id()) {
                continue;
            }
            total = total.saturating_add(invested_amount(sibling)?);
        }

        let financeable = terms.financeable();
        if total > financeable {
            return Err(AdmissionError::Overspend {
                mortgage: mortgage_id,
                total,
                financeable,
            });
        }
        Ok(())
    }

    /// Contracts matching `predicate` in the pool or persisted, deduped.
    fn known_matching(
        &self,
        pool: &PendingPool,
        store: &dyn LedgerStore,
        predicate: &dyn Fn(&Contract) -> bool,
    ) -> Result<Vec<Contract>, AdmissionError> {
        let mut seen: HashSet<Hash> = HashSet::new();
        let mut matching: Vec<Contract> = Vec::new();
        for contract in pool.iter().filter(|c| predicate(c)) {
            if seen.insert(contract.id()) {
                matching.push(contract.clone());
            }
        }
        for contract in store.find_contracts(predicate)? {
            if seen.insert(contract.id()) {
                matching.push(contract);
            }
        }
        Ok(matching)
    }

    /// Contracts matching `predicate` that are on the best chain.
    fn chained_matching(
        &self,
        store: &dyn LedgerStore,
        predicate: &dyn Fn(&Contract) -> bool,
    ) -> Result<Vec<Contract>, AdmissionError> {
        let mut chained = Vec::new();
        for contract in store.find_contracts(predicate)? {
            if store.contract_on_blockchain(&contract.id())? {
                chained.push(contract);
            }
        }
        Ok(chained)
    }
}

fn invested_amount(contract: &Contract) -> Result<u64, AdmissionError> {
    match Document::decode(contract.contract_type, &contract.document) {
        Ok(Document::Investment(investment)) => Ok(investment.amount),
        _ => Err(AdmissionError::BadDocument),
    }
}

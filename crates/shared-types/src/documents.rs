//! # Document Payloads
//!
//! The opaque `Contract::document` bytes decode into one of these payloads
//! according to the contract type. The admission policy reads financing
//! amounts from them; everything else treats documents as opaque.

use crate::entities::ContractType;
use crate::errors::CodecError;
use serde::{Deserialize, Serialize};

/// A bank financing a house purchase.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Mortgage {
    /// Identifier of the house being financed.
    pub house_id: String,
    /// Total price of the house.
    pub amount: u64,
    /// Portion financed by the bank itself; `amount - bank_amount` is open
    /// to investors.
    pub bank_amount: u64,
    /// Interest rate in hundredths of a percent.
    pub interest_rate_centi_pct: u32,
    /// Term of the mortgage.
    pub duration_months: u32,
}

impl Mortgage {
    /// The portion investors may collectively take over.
    pub fn financeable(&self) -> u64 {
        self.amount.saturating_sub(self.bank_amount)
    }
}

/// An investor taking over part of a mortgage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Investment {
    /// Amount invested against the parent mortgage.
    pub amount: u64,
    /// Interest rate in hundredths of a percent.
    pub interest_rate_centi_pct: u32,
    /// Term of the investment.
    pub duration_months: u32,
}

/// An ownership transfer descending from a prior contract.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transfer {
    /// Settlement amount of the transfer.
    pub amount: u64,
}

/// A decoded document payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Document {
    Mortgage(Mortgage),
    Investment(Investment),
    Transfer(Transfer),
}

impl Document {
    /// Decode payload bytes according to the contract type.
    pub fn decode(contract_type: ContractType, bytes: &[u8]) -> Result<Self, CodecError> {
        let decode_err = |e: bincode::Error| CodecError::Decode {
            what: "document",
            detail: e.to_string(),
        };
        match contract_type {
            ContractType::Mortgage => Ok(Self::Mortgage(
                bincode::deserialize(bytes).map_err(decode_err)?,
            )),
            ContractType::Investment => Ok(Self::Investment(
                bincode::deserialize(bytes).map_err(decode_err)?,
            )),
            ContractType::Transfer => Ok(Self::Transfer(
                bincode::deserialize(bytes).map_err(decode_err)?,
            )),
        }
    }

    /// Encode the payload into contract document bytes.
    pub fn encode(&self) -> Vec<u8> {
        // bincode of these small flat structs cannot fail
        match self {
            Self::Mortgage(m) => bincode::serialize(m).unwrap_or_default(),
            Self::Investment(i) => bincode::serialize(i).unwrap_or_default(),
            Self::Transfer(t) => bincode::serialize(t).unwrap_or_default(),
        }
    }

    /// The contract type this payload belongs with.
    pub fn contract_type(&self) -> ContractType {
        match self {
            Self::Mortgage(_) => ContractType::Mortgage,
            Self::Investment(_) => ContractType::Investment,
            Self::Transfer(_) => ContractType::Transfer,
        }
    }
}

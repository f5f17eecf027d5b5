use rust_decimal::Decimal;
use serde::Deserialize;
use tokenfolio_core::portfolio::holdings::Holding;

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HoldingInput {
    pub chain: String,
    #[serde(default)]
    pub contract_address: String,
    pub amount: Decimal,
}

impl From<HoldingInput> for Holding {
    fn from(input: HoldingInput) -> Self {
        Holding::new(&input.chain, &input.contract_address, input.amount)
    }
}

#[derive(Deserialize)]
pub struct RemoveHoldingQuery {
    pub chain: String,
    #[serde(default)]
    pub contract: String,
}

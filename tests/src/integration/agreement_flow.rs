//! End-to-end agreement flow: propose, counter-sign, mine, converge.

#[cfg(test)]
mod tests {
    use crate::integration::harness::TestNet;
    use shared_types::documents::{Document, Investment, Mortgage};
    use shared_types::entities::ContractType;

    fn mortgage_document() -> Document {
        Document::Mortgage(Mortgage {
            house_id: "NL-2628-CD-1".into(),
            amount: 200_000,
            bank_amount: 175_000,
            interest_rate_centi_pct: 250,
            duration_months: 360,
        })
    }

    #[test]
    fn test_propose_countersign_mine_converge() {
        // Node 0: borrower (not a verifier). Node 1: bank, the designated
        // verifier.
        let mut net = TestNet::new(&[(1, false), (2, true)]);
        let borrower = net.nodes[0].id;
        let bank = net.nodes[1].id;

        // Phase 1+2: two-phase signature exchange.
        let correlation = net.nodes[0]
            .ctx
            .propose_contract(mortgage_document(), Vec::new(), borrower, bank)
            .unwrap();
        assert_eq!(net.nodes[0].ctx.pending_requests(), 1);
        net.pump();

        // Both pending pools hold the finalized contract.
        assert_eq!(net.nodes[0].ctx.pending_contracts(), 1);
        assert_eq!(net.nodes[1].ctx.pending_contracts(), 1);
        assert_eq!(net.nodes[0].ctx.pending_requests(), 0, "{correlation} resolved");

        // The verifier's next production tick mines the contract.
        net.nodes[1].ctx.production_tick();
        net.pump();

        // Both nodes converge on the same tip and the same height.
        let tip = net.nodes[1].ctx.best_tip();
        assert_eq!(net.nodes[0].ctx.best_tip(), tip);
        assert_eq!(net.nodes[0].ctx.best_height(), 1);
        assert_eq!(net.nodes[1].ctx.best_height(), 1);
        assert_eq!(net.nodes[0].ctx.height_of(&tip), Some(1));
        assert_eq!(net.nodes[1].ctx.height_of(&tip), Some(1));

        // Settled contracts left both pools.
        assert_eq!(net.nodes[0].ctx.pending_contracts(), 0);
        assert_eq!(net.nodes[1].ctx.pending_contracts(), 0);

        let block = net.nodes[0].ctx.get_block(&tip).expect("tip is stored");
        assert_eq!(block.contracts.len(), 1);
        assert_eq!(block.contracts[0].contract_type, ContractType::Mortgage);
        assert!(net.nodes[0]
            .ctx
            .contract_on_chain(&block.contracts[0].id()));
    }

    #[test]
    fn test_overspending_investment_never_finalizes() {
        // Borrower, bank/verifier, investor.
        let mut net = TestNet::new(&[(1, false), (2, true), (3, false)]);
        let borrower = net.nodes[0].id;
        let bank = net.nodes[1].id;
        let investor = net.nodes[2].id;

        net.nodes[0]
            .ctx
            .propose_contract(mortgage_document(), Vec::new(), borrower, bank)
            .unwrap();
        net.pump();
        net.nodes[1].ctx.production_tick();
        net.pump();
        net.advance_epoch();

        let tip = net.nodes[1].ctx.best_tip();
        let mortgage = net.nodes[1].ctx.get_block(&tip).unwrap().contracts[0].clone();

        // First investment: 20000 of the 25000 financeable.
        net.nodes[2]
            .ctx
            .propose_contract(
                Document::Investment(Investment {
                    amount: 20_000,
                    interest_rate_centi_pct: 300,
                    duration_months: 120,
                }),
                mortgage.id().to_vec(),
                investor,
                bank,
            )
            .unwrap();
        net.pump();
        assert!(net.nodes[1].ctx.pending_contracts() >= 1);

        // Second investment: 10000 would overspend; the bank drops the
        // request and the investor's request is left to time out.
        net.nodes[2]
            .ctx
            .propose_contract(
                Document::Investment(Investment {
                    amount: 10_000,
                    interest_rate_centi_pct: 300,
                    duration_months: 120,
                }),
                mortgage.id().to_vec(),
                investor,
                bank,
            )
            .unwrap();
        let outstanding_before = net.nodes[2].ctx.pending_requests();
        net.pump();

        // The rejected proposal is still outstanding on the investor side.
        assert_eq!(net.nodes[2].ctx.pending_requests(), outstanding_before);

        // Only the first investment mines.
        net.nodes[1].ctx.production_tick();
        net.pump();
        let tip = net.nodes[1].ctx.best_tip();
        let block = net.nodes[1].ctx.get_block(&tip).unwrap();
        assert_eq!(block.contracts.len(), 1);
        assert_eq!(block.contracts[0].contract_type, ContractType::Investment);
        assert_eq!(net.nodes[1].ctx.best_height(), 2);
    }
}

//! Chain synchronization flows: orphan buffering and cascading catch-up.

#[cfg(test)]
mod tests {
    use crate::integration::harness::TestNet;
    use shared_types::documents::{Document, Mortgage, Transfer};
    use shared_types::LedgerMessage;

    fn mortgage_document(house: &str) -> Document {
        Document::Mortgage(Mortgage {
            house_id: house.into(),
            amount: 200_000,
            bank_amount: 175_000,
            interest_rate_centi_pct: 250,
            duration_months: 360,
        })
    }

    /// Mine one block on the verifier out of a fresh proposal and return
    /// the tip id.
    fn mine_once(net: &mut TestNet, house: &str) -> [u8; 32] {
        let borrower = net.nodes[0].id;
        let bank = net.nodes[1].id;
        net.nodes[0]
            .ctx
            .propose_contract(mortgage_document(house), Vec::new(), borrower, bank)
            .unwrap();
        net.pump();
        net.nodes[1].ctx.production_tick();
        net.pump();
        net.advance_epoch();
        net.nodes[1].ctx.best_tip()
    }

    #[test]
    fn test_late_joiner_resolves_orphans_through_block_requests() {
        let mut net = TestNet::new(&[(1, false), (2, true)]);

        let tip1 = mine_once(&mut net, "NL-2628-CD-1");
        let tip2 = mine_once(&mut net, "NL-2628-CD-2");
        assert_eq!(net.nodes[1].ctx.best_height(), 2);

        // A fresh node receives only the newest block: its parent is
        // unknown, so it buffers the orphan and requests the ancestor.
        let joiner = net.join(7, false);
        let bank = net.nodes[1].id;
        let block2 = net.nodes[1].ctx.get_block(&tip2).unwrap();
        net.nodes[joiner].deliver(bank, LedgerMessage::Block { block: block2 });
        assert_eq!(net.nodes[joiner].ctx.best_height(), 0);

        // The block-request round trip delivers the parent; acceptance
        // cascades: first the parent chains, then the buffered child.
        net.pump();
        assert_eq!(net.nodes[joiner].ctx.best_height(), 2);
        assert_eq!(net.nodes[joiner].ctx.height_of(&tip1), Some(1));
        assert_eq!(net.nodes[joiner].ctx.height_of(&tip2), Some(2));
        assert_eq!(net.nodes[joiner].ctx.best_tip(), tip2);
    }

    #[test]
    fn test_transfer_double_spend_rejected_across_nodes() {
        let mut net = TestNet::new(&[(1, false), (2, true), (3, false)]);
        let tip = mine_once(&mut net, "NL-2628-CD-1");
        let mortgage = net.nodes[1].ctx.get_block(&tip).unwrap().contracts[0].clone();

        let borrower = net.nodes[0].id;
        let bank = net.nodes[1].id;
        let other = net.nodes[2].id;

        // First transfer descending from the mortgage finalizes.
        net.nodes[0]
            .ctx
            .propose_contract(
                Document::Transfer(Transfer { amount: 1_000 }),
                mortgage.id().to_vec(),
                borrower,
                bank,
            )
            .unwrap();
        net.pump();
        assert_eq!(net.nodes[1].ctx.pending_contracts(), 1);

        // A second transfer sharing the same parent is rejected by the
        // bank regardless of arriving later from a different peer.
        net.nodes[2]
            .ctx
            .propose_contract(
                Document::Transfer(Transfer { amount: 2_000 }),
                mortgage.id().to_vec(),
                other,
                bank,
            )
            .unwrap();
        net.pump();
        assert_eq!(net.nodes[1].ctx.pending_contracts(), 1);

        // Only the first transfer ever chains.
        net.nodes[1].ctx.production_tick();
        net.pump();
        let block = net.nodes[1]
            .ctx
            .get_block(&net.nodes[1].ctx.best_tip())
            .unwrap();
        assert_eq!(block.contracts.len(), 1);
        assert_eq!(
            block.contracts[0].previous_hash,
            mortgage.id().to_vec()
        );
    }
}

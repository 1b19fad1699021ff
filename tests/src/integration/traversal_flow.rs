//! Confirmation query flow: a non-verifier asks how deep a contract is.

#[cfg(test)]
mod tests {
    use crate::integration::harness::TestNet;
    use mc_04_agreement::AgreementEvent;
    use shared_types::documents::{Document, Mortgage};
    use shared_types::entities::ContractType;

    fn mortgage_document(house: &str) -> Document {
        Document::Mortgage(Mortgage {
            house_id: house.into(),
            amount: 200_000,
            bank_amount: 175_000,
            interest_rate_centi_pct: 250,
            duration_months: 360,
        })
    }

    fn mine_once(net: &mut TestNet, house: &str) {
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
    }

    #[test]
    fn test_confirmation_depth_reaches_quorum() {
        let mut net = TestNet::new(&[(1, false), (2, true)]);

        mine_once(&mut net, "NL-2628-CD-1");
        let first_tip = net.nodes[1].ctx.best_tip();
        let mortgage = net.nodes[1].ctx.get_block(&first_tip).unwrap().contracts[0].clone();
        mine_once(&mut net, "NL-2628-CD-2");
        assert_eq!(net.nodes[1].ctx.best_height(), 2);

        // One block on top of the mortgage's block: depth 1.
        net.nodes[0].ctx.drain_events();
        let id = net.nodes[0].ctx.query_confirmations(mortgage.id(), None);
        net.pump();

        let events = net.nodes[0].ctx.drain_events();
        match events.as_slice() {
            [AgreementEvent::TraversalResolved {
                id: resolved,
                contract,
                confirmations,
            }] => {
                assert_eq!(*resolved, id);
                assert_eq!(contract.as_ref().map(|c| c.id()), Some(mortgage.id()));
                assert_eq!(*confirmations, Some(1));
            }
            other => panic!("expected one resolution, got {other:?}"),
        }
        assert_eq!(net.nodes[0].ctx.pending_requests(), 0);
    }

    #[test]
    fn test_unchained_contract_resolves_to_none() {
        let mut net = TestNet::new(&[(1, false), (2, true)]);
        mine_once(&mut net, "NL-2628-CD-1");

        net.nodes[0].ctx.drain_events();
        let id = net.nodes[0].ctx.query_confirmations([0xAB; 32], None);
        net.pump();

        let events = net.nodes[0].ctx.drain_events();
        match events.as_slice() {
            [AgreementEvent::TraversalResolved {
                id: resolved,
                contract,
                confirmations,
            }] => {
                assert_eq!(*resolved, id);
                assert!(contract.is_none());
                assert!(confirmations.is_none());
            }
            other => panic!("expected one resolution, got {other:?}"),
        }
    }

    #[test]
    fn test_latest_of_type_query() {
        let mut net = TestNet::new(&[(1, false), (2, true)]);

        mine_once(&mut net, "NL-2628-CD-1");
        let first_tip = net.nodes[1].ctx.best_tip();
        let mortgage = net.nodes[1].ctx.get_block(&first_tip).unwrap().contracts[0].clone();

        // An investment descending from the mortgage, mined at height 2.
        let investor = net.nodes[0].id;
        let bank = net.nodes[1].id;
        net.nodes[0]
            .ctx
            .propose_contract(
                Document::Investment(shared_types::documents::Investment {
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
        net.nodes[1].ctx.production_tick();
        net.pump();

        net.nodes[0].ctx.drain_events();
        net.nodes[0]
            .ctx
            .query_confirmations(mortgage.id(), Some(ContractType::Investment));
        net.pump();

        let events = net.nodes[0].ctx.drain_events();
        match events.as_slice() {
            [AgreementEvent::TraversalResolved {
                contract,
                confirmations,
                ..
            }] => {
                let found = contract.as_ref().expect("descendant investment is chained");
                assert_eq!(found.contract_type, ContractType::Investment);
                assert_eq!(found.previous_hash, mortgage.id().to_vec());
                assert_eq!(*confirmations, Some(0));
            }
            other => panic!("expected one resolution, got {other:?}"),
        }
    }
}

//! Two simulated clients wired directly together, no transport.
//!
//! Outbound messages from one session are fed straight into the other's
//! `handle_message`, the way the channel would deliver them.

use sonnet_collab::EditSession;
use sonnet_core::collab::ChannelMessage;
use sonnet_core::poem::PoemSetDoc;

const POEM_SET_ID: i64 = 42;

fn client(user_id: i64, name: &str) -> EditSession {
    EditSession::new(POEM_SET_ID, user_id, name, None, PoemSetDoc::blank())
}

fn deliver(from: Vec<ChannelMessage>, to: &mut EditSession) {
    for msg in from {
        to.handle_message(msg);
    }
}

#[test]
fn focus_propagates_as_lock_to_the_other_client() {
    let mut anna = client(1, "anna");
    let mut boris = client(2, "boris");

    deliver(anna.focus(3), &mut boris);

    assert!(boris.is_sonnet_locked(3));
    assert_eq!(boris.locks().holder(3).unwrap().user_name, "anna");
    // Boris's presence view of Anna shows her editing sonnet 3.
    assert_eq!(boris.presence().get(1).unwrap().editing_sonnet, Some(3));

    deliver(anna.blur(), &mut boris);
    assert!(!boris.is_sonnet_locked(3));
    assert_eq!(boris.presence().get(1).unwrap().editing_sonnet, None);
}

#[test]
fn merge_overwrites_unfocused_client_but_shields_focused_one() {
    let mut anna = client(1, "anna");
    let mut boris = client(2, "boris");

    // Both clients have unsaved local text in sonnet 3.
    anna.set_line(3, 0, "anna draft");
    boris.set_line(3, 0, "boris draft");
    deliver(anna.focus(3), &mut boris);

    // Anna's save lands; the store fans out the full new document.
    let mut saved = PoemSetDoc::blank();
    saved.poems[3].lines[0] = "anna draft".to_string();
    let update = ChannelMessage::DocUpdated {
        poem_set_id: POEM_SET_ID,
        doc: saved.clone(),
        updated_by: Some(1),
    };

    // Boris is not focused on sonnet 3: his local draft is overwritten.
    let outcome = boris.handle_message(update.clone()).unwrap();
    assert_eq!(outcome.replaced_sonnets, vec![3]);
    assert_eq!(boris.doc().poems[3].lines[0], "anna draft");

    // Anna is focused there: her copy is shielded from her own echo and
    // from anyone else's write alike.
    let mut incoming = PoemSetDoc::blank();
    incoming.poems[3].lines[0] = "someone else".to_string();
    let outcome = anna
        .handle_message(ChannelMessage::DocUpdated {
            poem_set_id: POEM_SET_ID,
            doc: incoming,
            updated_by: Some(2),
        })
        .unwrap();
    assert_eq!(outcome.shielded_sonnets, vec![3]);
    assert_eq!(anna.doc().poems[3].lines[0], "anna draft");
}

#[test]
fn near_simultaneous_locks_diverge_by_delivery_order() {
    let mut anna = client(1, "anna");
    let mut boris = client(2, "boris");
    let mut carla = client(3, "carla");

    let from_anna = anna.focus(5);
    let from_boris = boris.focus(5);

    // Carla sees Anna's lock first, then Boris's: Boris wins for her.
    deliver(from_anna.clone(), &mut carla);
    deliver(from_boris.clone(), &mut carla);
    assert_eq!(carla.locks().holder(5).unwrap().user_id, 2);

    // Each focused client still believes it holds the lock locally.
    deliver(from_boris, &mut anna);
    deliver(from_anna, &mut boris);
    assert_eq!(anna.locks().holder(5).unwrap().user_id, 1);
    assert_eq!(boris.locks().holder(5).unwrap().user_id, 2);
}

#[test]
fn leave_cleans_up_the_leavers_locks_everywhere() {
    let mut anna = client(1, "anna");
    let mut boris = client(2, "boris");

    deliver(anna.focus(0), &mut boris);
    deliver(boris.focus(8), &mut anna);

    // Anna's connection drops; the hub broadcasts her leave.
    boris.handle_message(ChannelMessage::PresenceLeave { user_id: 1 });

    assert!(boris.locks().holder(0).is_none());
    assert_eq!(boris.locks().holder(8).unwrap().user_id, 2);
}

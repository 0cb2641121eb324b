//! Contract events emitted during execution

use crate::membuffers::{Builder, CodecError, Encodable, InternalMessage, NO_UNIONS, build};

use super::Result;
use super::arguments::{Argument, packed_arguments_decode, packed_arguments_encode};
use super::schemes::{EVENT_SCHEME, EVENTS_ARRAY_SCHEME};

/// Event emitted by a contract.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Event {
    /// Emitting contract
    pub contract_name: String,
    /// Event name
    pub event_name: String,
    /// Event payload
    pub arguments: Vec<Argument>,
}

impl Encodable for Event {
    fn write(&self, builder: &mut Builder<'_>) -> std::result::Result<(), CodecError> {
        builder.write_string(&self.contract_name)?;
        builder.write_string(&self.event_name)?;
        builder.write_bytes(&packed_arguments_encode(&self.arguments)?)
    }
}

/// `EventsArray` message wrapping a list of events.
#[derive(Debug, Clone, Copy)]
pub struct EventsArray<'a>(pub &'a [Event]);

impl Encodable for EventsArray<'_> {
    fn write(&self, builder: &mut Builder<'_>) -> std::result::Result<(), CodecError> {
        builder.write_message_array(self.0)
    }
}

/// Pack events the way receipts carry them.
pub fn packed_events_encode(events: &[Event]) -> std::result::Result<Vec<u8>, CodecError> {
    let buf = build(&EventsArray(events))?;
    let msg = InternalMessage::new(buf.as_slice(), EVENTS_ARRAY_SCHEME, NO_UNIONS);
    Ok(msg.raw_buffer_for_field(0)?.to_vec())
}

fn decode_event(buf: &[u8]) -> Result<Event> {
    let msg = InternalMessage::new(buf, EVENT_SCHEME, NO_UNIONS);
    msg.validate()?;
    Ok(Event {
        contract_name: msg.get_string(0)?.to_owned(),
        event_name: msg.get_string(1)?.to_owned(),
        arguments: packed_arguments_decode(msg.raw_buffer_with_header_for_field(2)?)?,
    })
}

/// Unpack an events array given with its length prefix. An empty buffer is
/// an empty list.
pub fn packed_events_decode(buf: &[u8]) -> Result<Vec<Event>> {
    if buf.is_empty() {
        return Ok(Vec::new());
    }
    let msg = InternalMessage::new(buf, EVENTS_ARRAY_SCHEME, NO_UNIONS);
    msg.validate()?;
    msg.get_message_array_iter(0)?
        .map(|raw| decode_event(raw?.as_bytes()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::Error;

    #[test]
    fn test_events_survive_packing() {
        let events = vec![
            Event {
                contract_name: "BenchmarkToken".into(),
                event_name: "Transfer".into(),
                arguments: vec![Argument::Uint64(10), Argument::Bytes20([7; 20])],
            },
            Event {
                contract_name: "Counter".into(),
                event_name: "Reset".into(),
                arguments: vec![],
            },
        ];
        let packed = packed_events_encode(&events).unwrap();
        let mut buf = u32::try_from(packed.len()).unwrap().to_le_bytes().to_vec();
        buf.extend_from_slice(&packed);
        assert_eq!(packed_events_decode(&buf).unwrap(), events);
    }

    #[test]
    fn test_event_with_trailing_bytes_is_rejected() {
        let mut event = build(&Event {
            contract_name: "Counter".into(),
            event_name: "Reset".into(),
            arguments: vec![],
        })
        .unwrap();
        event.extend_from_slice(&[0; 4]);
        let mut buf = u32::try_from(event.len() + 4).unwrap().to_le_bytes().to_vec();
        buf.extend_from_slice(&u32::try_from(event.len()).unwrap().to_le_bytes());
        buf.extend_from_slice(&event);
        assert!(matches!(
            packed_events_decode(&buf),
            Err(Error::Codec(CodecError::InvalidStructure { .. }))
        ));
    }

    #[test]
    fn test_empty_events() {
        assert!(packed_events_decode(&[]).unwrap().is_empty());
    }
}

//! Event-driven consumption of cables.
//!
//! [`handle_cable`] walks a cable's fields in a fixed order and reports each
//! one to a [`CableHandler`]. Exporters implement the handler; the stock
//! implementations here cover discarding, logging, fan-out and filtering.


use anyhow::{Context, Result};
use tracing::{debug, info};

use crate::cable::Cable;
use crate::model::{Recipient, Reference};

/// Receives the fields of a sequence of cables. Every method defaults to a
/// no-op, so implementors override only what they consume.
#[allow(unused_variables)]
pub trait CableHandler {
    fn start(&mut self) -> Result<()> {
        Ok(())
    }

    /// Whether the cable's fields should be extracted and reported at all.
    fn accepts(&mut self, cable: &Cable) -> bool {
        true
    }

    fn start_cable(&mut self, cable: &Cable) -> Result<()> {
        Ok(())
    }

    fn handle_reference_id(&mut self, reference_id: &str) -> Result<()> {
        Ok(())
    }

    fn handle_canonical_id(&mut self, canonical_id: &str) -> Result<()> {
        Ok(())
    }

    fn handle_origin(&mut self, origin: &str) -> Result<()> {
        Ok(())
    }

    fn handle_created(&mut self, created: &str) -> Result<()> {
        Ok(())
    }

    fn handle_released(&mut self, released: &str) -> Result<()> {
        Ok(())
    }

    fn handle_classification(&mut self, classification: &[String]) -> Result<()> {
        Ok(())
    }

    fn handle_partial(&mut self, partial: bool) -> Result<()> {
        Ok(())
    }

    fn handle_transmission_id(&mut self, transmission_id: Option<&str>) -> Result<()> {
        Ok(())
    }

    fn handle_recipient(&mut self, recipient: &Recipient) -> Result<()> {
        Ok(())
    }

    fn handle_info_recipient(&mut self, recipient: &Recipient) -> Result<()> {
        Ok(())
    }

    fn handle_subject(&mut self, subject: Option<&str>) -> Result<()> {
        Ok(())
    }

    fn handle_tags(&mut self, tags: &[String]) -> Result<()> {
        Ok(())
    }

    fn handle_reference(&mut self, reference: &Reference) -> Result<()> {
        Ok(())
    }

    fn handle_summary(&mut self, summary: Option<&str>) -> Result<()> {
        Ok(())
    }

    fn handle_nondisclosure_deadline(&mut self, deadline: Option<&str>) -> Result<()> {
        Ok(())
    }

    fn handle_signers(&mut self, signers: &[String]) -> Result<()> {
        Ok(())
    }

    fn handle_classificationists(&mut self, classificationists: &[String]) -> Result<()> {
        Ok(())
    }

    fn handle_header(&mut self, header: &str) -> Result<()> {
        Ok(())
    }

    fn handle_body(&mut self, body: &str) -> Result<()> {
        Ok(())
    }

    fn end_cable(&mut self, cable: &Cable) -> Result<()> {
        Ok(())
    }

    fn end(&mut self) -> Result<()> {
        Ok(())
    }
}

/// Reports every field of `cable` to `handler`.
///
/// With `standalone` the cable is wrapped in its own `start`/`end` pair.
pub fn handle_cable<H>(cable: &Cable, handler: &mut H, standalone: bool) -> Result<()>
where
    H: CableHandler + ?Sized,
{
    if standalone {
        handler.start()?;
    }
    if handler.accepts(cable) {
        emit_cable(cable, handler)
            .with_context(|| format!("failed to handle cable {}", cable.reference_id()))?;
    } else {
        debug!(reference_id = %cable.reference_id(), "cable filtered out");
    }
    if standalone {
        handler.end()?;
    }
    Ok(())
}

/// Reports a sequence of cables between a single `start`/`end` pair.
pub fn handle_cables<I, C, H>(cables: I, handler: &mut H) -> Result<()>
where
    I: IntoIterator<Item = C>,
    C: std::borrow::Borrow<Cable>,
    H: CableHandler + ?Sized,
{
    use std::borrow::Borrow;

    handler.start()?;
    let mut count = 0_usize;
    for cable in cables {
        handle_cable(cable.borrow(), handler, false)?;
        count += 1;
    }
    handler.end()?;
    debug!(cable_count = count, "handled cables");
    Ok(())
}

fn emit_cable<H>(cable: &Cable, handler: &mut H) -> Result<()>
where
    H: CableHandler + ?Sized,
{
    handler.start_cable(cable)?;
    handler.handle_reference_id(cable.reference_id())?;
    handler.handle_canonical_id(cable.canonical_id())?;
    handler.handle_origin(cable.origin())?;
    handler.handle_created(cable.created())?;
    handler.handle_released(cable.released())?;
    handler.handle_classification(cable.classification())?;
    handler.handle_partial(cable.is_partial())?;
    handler.handle_transmission_id(cable.transmission_id()?)?;
    for recipient in cable.recipients()? {
        handler.handle_recipient(recipient)?;
    }
    for recipient in cable.info_recipients()? {
        handler.handle_info_recipient(recipient)?;
    }
    handler.handle_subject(cable.subject()?)?;
    handler.handle_tags(cable.tags()?)?;
    for reference in cable.references()? {
        handler.handle_reference(reference)?;
    }
    handler.handle_summary(cable.summary()?)?;
    handler.handle_nondisclosure_deadline(cable.nondisclosure_deadline()?)?;
    handler.handle_signers(cable.signers())?;
    handler.handle_classificationists(cable.classificationists()?)?;
    handler.handle_header(cable.header())?;
    handler.handle_body(cable.content())?;
    handler.end_cable(cable)
}

/// Discards every event.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopHandler;

impl CableHandler for NoopHandler {}

/// Logs one line per cable at `info` and the extracted fields at `debug`.
#[derive(Debug, Default)]
pub struct LoggingHandler {
    cables: usize,
    current: Option<String>,
}

impl LoggingHandler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cable_count(&self) -> usize {
        self.cables
    }

    fn current(&self) -> &str {
        self.current.as_deref().unwrap_or("<none>")
    }
}

impl CableHandler for LoggingHandler {
    fn start(&mut self) -> Result<()> {
        self.cables = 0;
        debug!("cable stream started");
        Ok(())
    }

    fn start_cable(&mut self, cable: &Cable) -> Result<()> {
        self.current = Some(cable.reference_id().to_string());
        Ok(())
    }

    fn handle_canonical_id(&mut self, canonical_id: &str) -> Result<()> {
        debug!(reference_id = %self.current(), canonical_id = %canonical_id, "canonical id");
        Ok(())
    }

    fn handle_transmission_id(&mut self, transmission_id: Option<&str>) -> Result<()> {
        debug!(
            reference_id = %self.current(),
            transmission_id = transmission_id.unwrap_or("-"),
            "transmission id"
        );
        Ok(())
    }

    fn handle_recipient(&mut self, recipient: &Recipient) -> Result<()> {
        debug!(
            reference_id = %self.current(),
            name = %recipient.name,
            route = recipient.route.as_deref().unwrap_or("-"),
            "recipient"
        );
        Ok(())
    }

    fn handle_subject(&mut self, subject: Option<&str>) -> Result<()> {
        debug!(reference_id = %self.current(), subject = subject.unwrap_or("-"), "subject");
        Ok(())
    }

    fn handle_tags(&mut self, tags: &[String]) -> Result<()> {
        debug!(reference_id = %self.current(), tags = %tags.join(","), "tags");
        Ok(())
    }

    fn handle_reference(&mut self, reference: &Reference) -> Result<()> {
        debug!(reference_id = %self.current(), reference = %reference.value, "reference");
        Ok(())
    }

    fn end_cable(&mut self, cable: &Cable) -> Result<()> {
        self.cables += 1;
        info!(
            reference_id = %cable.reference_id(),
            partial = cable.is_partial(),
            "cable handled"
        );
        self.current = None;
        Ok(())
    }

    fn end(&mut self) -> Result<()> {
        info!(cable_count = self.cables, "cable stream finished");
        Ok(())
    }
}

/// Forwards every event to each inner handler in turn. A cable is accepted
/// only when every inner handler accepts it.
#[derive(Default)]
pub struct TeeHandler {
    handlers: Vec<Box<dyn CableHandler>>,
}

impl TeeHandler {
    pub fn push(&mut self, handler: Box<dyn CableHandler>) {
        self.handlers.push(handler);
    }

    fn each(&mut self, mut event: impl FnMut(&mut dyn CableHandler) -> Result<()>) -> Result<()> {
        for handler in &mut self.handlers {
            event(handler.as_mut())?;
        }
        Ok(())
    }
}

impl CableHandler for TeeHandler {
    fn start(&mut self) -> Result<()> {
        self.each(|h| h.start())
    }

    fn accepts(&mut self, cable: &Cable) -> bool {
        self.handlers.iter_mut().all(|h| h.accepts(cable))
    }

    fn start_cable(&mut self, cable: &Cable) -> Result<()> {
        self.each(|h| h.start_cable(cable))
    }

    fn handle_reference_id(&mut self, reference_id: &str) -> Result<()> {
        self.each(|h| h.handle_reference_id(reference_id))
    }

    fn handle_canonical_id(&mut self, canonical_id: &str) -> Result<()> {
        self.each(|h| h.handle_canonical_id(canonical_id))
    }

    fn handle_origin(&mut self, origin: &str) -> Result<()> {
        self.each(|h| h.handle_origin(origin))
    }

    fn handle_created(&mut self, created: &str) -> Result<()> {
        self.each(|h| h.handle_created(created))
    }

    fn handle_released(&mut self, released: &str) -> Result<()> {
        self.each(|h| h.handle_released(released))
    }

    fn handle_classification(&mut self, classification: &[String]) -> Result<()> {
        self.each(|h| h.handle_classification(classification))
    }

    fn handle_partial(&mut self, partial: bool) -> Result<()> {
        self.each(|h| h.handle_partial(partial))
    }

    fn handle_transmission_id(&mut self, transmission_id: Option<&str>) -> Result<()> {
        self.each(|h| h.handle_transmission_id(transmission_id))
    }

    fn handle_recipient(&mut self, recipient: &Recipient) -> Result<()> {
        self.each(|h| h.handle_recipient(recipient))
    }

    fn handle_info_recipient(&mut self, recipient: &Recipient) -> Result<()> {
        self.each(|h| h.handle_info_recipient(recipient))
    }

    fn handle_subject(&mut self, subject: Option<&str>) -> Result<()> {
        self.each(|h| h.handle_subject(subject))
    }

    fn handle_tags(&mut self, tags: &[String]) -> Result<()> {
        self.each(|h| h.handle_tags(tags))
    }

    fn handle_reference(&mut self, reference: &Reference) -> Result<()> {
        self.each(|h| h.handle_reference(reference))
    }

    fn handle_summary(&mut self, summary: Option<&str>) -> Result<()> {
        self.each(|h| h.handle_summary(summary))
    }

    fn handle_nondisclosure_deadline(&mut self, deadline: Option<&str>) -> Result<()> {
        self.each(|h| h.handle_nondisclosure_deadline(deadline))
    }

    fn handle_signers(&mut self, signers: &[String]) -> Result<()> {
        self.each(|h| h.handle_signers(signers))
    }

    fn handle_classificationists(&mut self, classificationists: &[String]) -> Result<()> {
        self.each(|h| h.handle_classificationists(classificationists))
    }

    fn handle_header(&mut self, header: &str) -> Result<()> {
        self.each(|h| h.handle_header(header))
    }

    fn handle_body(&mut self, body: &str) -> Result<()> {
        self.each(|h| h.handle_body(body))
    }

    fn end_cable(&mut self, cable: &Cable) -> Result<()> {
        self.each(|h| h.end_cable(cable))
    }

    fn end(&mut self) -> Result<()> {
        self.each(|h| h.end())
    }
}

/// Hands a cable to `inner` only when `accept` returns true for it.
/// Rejected cables are never extracted. `start` and `end` always pass.
pub struct FilteringHandler<H, F> {
    inner: H,
    accept: F,
}

impl<H, F> FilteringHandler<H, F>
where
    H: CableHandler,
    F: FnMut(&Cable) -> bool,
{
    pub fn new(inner: H, accept: F) -> Self {
        Self { inner, accept }
    }
}

impl<H, F> CableHandler for FilteringHandler<H, F>
where
    H: CableHandler,
    F: FnMut(&Cable) -> bool,
{
    fn start(&mut self) -> Result<()> {
        self.inner.start()
    }

    fn accepts(&mut self, cable: &Cable) -> bool {
        (self.accept)(cable) && self.inner.accepts(cable)
    }

    fn start_cable(&mut self, cable: &Cable) -> Result<()> {
        self.inner.start_cable(cable)
    }

    fn handle_reference_id(&mut self, reference_id: &str) -> Result<()> {
        self.inner.handle_reference_id(reference_id)
    }

    fn handle_canonical_id(&mut self, canonical_id: &str) -> Result<()> {
        self.inner.handle_canonical_id(canonical_id)
    }

    fn handle_origin(&mut self, origin: &str) -> Result<()> {
        self.inner.handle_origin(origin)
    }

    fn handle_created(&mut self, created: &str) -> Result<()> {
        self.inner.handle_created(created)
    }

    fn handle_released(&mut self, released: &str) -> Result<()> {
        self.inner.handle_released(released)
    }

    fn handle_classification(&mut self, classification: &[String]) -> Result<()> {
        self.inner.handle_classification(classification)
    }

    fn handle_partial(&mut self, partial: bool) -> Result<()> {
        self.inner.handle_partial(partial)
    }

    fn handle_transmission_id(&mut self, transmission_id: Option<&str>) -> Result<()> {
        self.inner.handle_transmission_id(transmission_id)
    }

    fn handle_recipient(&mut self, recipient: &Recipient) -> Result<()> {
        self.inner.handle_recipient(recipient)
    }

    fn handle_info_recipient(&mut self, recipient: &Recipient) -> Result<()> {
        self.inner.handle_info_recipient(recipient)
    }

    fn handle_subject(&mut self, subject: Option<&str>) -> Result<()> {
        self.inner.handle_subject(subject)
    }

    fn handle_tags(&mut self, tags: &[String]) -> Result<()> {
        self.inner.handle_tags(tags)
    }

    fn handle_reference(&mut self, reference: &Reference) -> Result<()> {
        self.inner.handle_reference(reference)
    }

    fn handle_summary(&mut self, summary: Option<&str>) -> Result<()> {
        self.inner.handle_summary(summary)
    }

    fn handle_nondisclosure_deadline(&mut self, deadline: Option<&str>) -> Result<()> {
        self.inner.handle_nondisclosure_deadline(deadline)
    }

    fn handle_signers(&mut self, signers: &[String]) -> Result<()> {
        self.inner.handle_signers(signers)
    }

    fn handle_classificationists(&mut self, classificationists: &[String]) -> Result<()> {
        self.inner.handle_classificationists(classificationists)
    }

    fn handle_header(&mut self, header: &str) -> Result<()> {
        self.inner.handle_header(header)
    }

    fn handle_body(&mut self, body: &str) -> Result<()> {
        self.inner.handle_body(body)
    }

    fn end_cable(&mut self, cable: &Cable) -> Result<()> {
        self.inner.end_cable(cable)
    }

    fn end(&mut self) -> Result<()> {
        self.inner.end()
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;
    use std::sync::Arc;

    use super::*;
    use crate::config::{CableConfig, CableOptions};
    use crate::meta::CableMetadata;

    type Events = Rc<RefCell<Vec<String>>>;

    /// Records the name of every event it sees.
    struct Recorder {
        events: Events,
    }

    impl CableHandler for Recorder {
        fn start(&mut self) -> Result<()> {
            self.events.borrow_mut().push("start".to_string());
            Ok(())
        }

        fn start_cable(&mut self, cable: &Cable) -> Result<()> {
            self.events
                .borrow_mut()
                .push(format!("start_cable {}", cable.reference_id()));
            Ok(())
        }

        fn handle_subject(&mut self, subject: Option<&str>) -> Result<()> {
            self.events
                .borrow_mut()
                .push(format!("subject {}", subject.unwrap_or("-")));
            Ok(())
        }

        fn handle_reference(&mut self, reference: &Reference) -> Result<()> {
            self.events
                .borrow_mut()
                .push(format!("reference {}", reference.value));
            Ok(())
        }

        fn end_cable(&mut self, _cable: &Cable) -> Result<()> {
            self.events.borrow_mut().push("end_cable".to_string());
            Ok(())
        }

        fn end(&mut self) -> Result<()> {
            self.events.borrow_mut().push("end".to_string());
            Ok(())
        }
    }

    fn recorder() -> (Recorder, Events) {
        let events = Events::default();
        (
            Recorder {
                events: Rc::clone(&events),
            },
            events,
        )
    }

    fn cable(reference_id: &str, content: &str) -> Cable {
        Cable::from_parts(
            CableMetadata {
                reference_id: reference_id.to_string(),
                created: "2008-05-01 12:00".to_string(),
                released: "2011-08-30 01:44".to_string(),
                classification: vec!["CONFIDENTIAL".to_string()],
                origin: "Embassy Tbilisi".to_string(),
            },
            String::new(),
            content.to_string(),
            Arc::new(CableConfig::default()),
            CableOptions::default(),
        )
        .unwrap()
    }

    fn tbilisi() -> Cable {
        cable(
            "08TBILISI1",
            "C O N F I D E N T I A L TBILISI 000001\n\nTAGS: PREL, GG\nSUBJECT: VISIT\n\nREF: STATE 77\n\n1. Text.",
        )
    }

    #[test]
    fn events_arrive_in_order() {
        let (mut handler, events) = recorder();
        handle_cable(&tbilisi(), &mut handler, true).unwrap();
        assert_eq!(
            *events.borrow(),
            vec![
                "start",
                "start_cable 08TBILISI1",
                "subject VISIT",
                "reference 08STATE77",
                "end_cable",
                "end",
            ]
        );
    }

    #[test]
    fn many_cables_share_one_start_and_end() {
        let (mut handler, events) = recorder();
        let cables = vec![tbilisi(), tbilisi()];
        handle_cables(&cables, &mut handler).unwrap();
        let events = events.borrow();
        assert_eq!(events.iter().filter(|e| *e == "start").count(), 1);
        assert_eq!(events.iter().filter(|e| *e == "end").count(), 1);
        assert_eq!(events.iter().filter(|e| *e == "end_cable").count(), 2);
    }

    #[test]
    fn tee_fans_out_to_every_handler() {
        let (first, first_events) = recorder();
        let (second, second_events) = recorder();
        let mut tee = TeeHandler::default();
        tee.push(Box::new(first));
        tee.push(Box::new(second));
        tee.push(Box::new(NoopHandler));
        handle_cable(&tbilisi(), &mut tee, true).unwrap();
        assert_eq!(*first_events.borrow(), *second_events.borrow());
        assert_eq!(first_events.borrow().len(), 6);
    }

    #[test]
    fn filter_drops_rejected_cables() {
        let (inner, events) = recorder();
        let mut filter =
            FilteringHandler::new(inner, |cable: &Cable| cable.reference_id() != "08TBILISI2");
        let cables = vec![tbilisi(), cable("08TBILISI2", "SUBJECT: OTHER\n\nTAGS: PREL")];
        handle_cables(&cables, &mut filter).unwrap();

        let events = events.borrow();
        assert!(events.contains(&"start_cable 08TBILISI1".to_string()));
        assert!(!events.contains(&"start_cable 08TBILISI2".to_string()));
        assert!(!events.contains(&"subject OTHER".to_string()));
        assert_eq!(events.first().map(String::as_str), Some("start"));
        assert_eq!(events.last().map(String::as_str), Some("end"));
    }

    #[test]
    fn rejected_cables_are_never_extracted() {
        let (inner, events) = recorder();
        let mut filter =
            FilteringHandler::new(inner, |cable: &Cable| cable.reference_id() == "08TBILISI1");
        let untagged = cable("08TBILISI4", "SUBJECT: UNTAGGED\n\n1. Text.");
        let cables = vec![tbilisi(), untagged];
        handle_cables(&cables, &mut filter).unwrap();

        assert!(!events.borrow().contains(&"start_cable 08TBILISI4".to_string()));
        assert!(cables[1].tags().is_err());
    }

    #[test]
    fn tee_accepts_only_what_every_handler_accepts() {
        let (inner, events) = recorder();
        let mut tee = TeeHandler::default();
        tee.push(Box::new(FilteringHandler::new(inner, |_: &Cable| false)));
        tee.push(Box::new(LoggingHandler::new()));
        handle_cable(&tbilisi(), &mut tee, true).unwrap();
        assert_eq!(*events.borrow(), vec!["start", "end"]);
    }

    #[test]
    fn extraction_errors_name_the_cable() {
        let untagged = cable("08TBILISI3", "SUBJECT: UNTAGGED\n\n1. Text.");
        let err = handle_cable(&untagged, &mut NoopHandler, true).unwrap_err();
        assert!(err.to_string().contains("08TBILISI3"));
    }

    #[test]
    fn logging_handler_counts_cables() {
        let mut handler = LoggingHandler::new();
        handle_cables([tbilisi(), tbilisi()], &mut handler).unwrap();
        assert_eq!(handler.cable_count(), 2);
    }
}

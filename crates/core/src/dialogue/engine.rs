use crate::calc::{area_quote, length_quote, piece_quote, CalcError, ReservePolicy};
use crate::catalog::{Catalog, PanelProduct, ProfileKind, SlatKind};
use crate::dialogue::states::{
    Category, Choice, Event, MessageIntent, OpeningStage, Phase, StepOutcome,
};
use crate::input::{parse_measure, parse_opening, parse_quantity, Unit};
use crate::session::{
    CalculationResult, HeightMode, Material, Opening, Quantity, Selection, Session,
};

/// Drives one conversation through the selection and measurement dialogue.
///
/// Performs no I/O: every step takes the session plus one inbound event and
/// returns outbound message intents. All recoverable failures (bad input,
/// catalog misses, impossible dimensions) are resolved to re-prompts here;
/// only a panic escapes, and the dispatch bridge isolates those.
pub struct DialogueEngine {
    catalog: Catalog,
    reserve: ReservePolicy,
}

impl DialogueEngine {
    pub fn new(catalog: Catalog, reserve: ReservePolicy) -> Self {
        Self { catalog, reserve }
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn step(&self, session: &mut Session, event: &Event) -> StepOutcome {
        // A failed outbound send is reported on the next interaction.
        let mut pending_note = None;
        if let Some(failure) = session.last_send_failure.take() {
            pending_note =
                Some(MessageIntent::text(format!("Part of the previous reply was not delivered ({failure}). Here is where we left off.")));
        }

        let mut outcome = self.apply(session, event);
        if let Some(note) = pending_note {
            outcome.replies.insert(0, note);
        }
        outcome
    }

    fn apply(&self, session: &mut Session, event: &Event) -> StepOutcome {
        if let Event::Choice(Choice::StartOver) = event {
            session.reset();
            return StepOutcome::replies(vec![
                MessageIntent::text(
                    "Hi! I help pick wall materials and estimate panel quantities, waste, and cost.",
                ),
                self.prompt_for(session),
            ]);
        }

        let phase = session.phase.clone();
        match (phase, event) {
            (Phase::Idle, Event::Choice(Choice::StartCalculation)) => {
                // A finished quote stays on the session until a new
                // calculation begins.
                if session.materials_locked || !session.results.is_empty() {
                    session.reset();
                }
                self.advance(session, Phase::SelectingCategory)
            }
            (Phase::Idle, Event::Choice(Choice::SendToAdmin)) => {
                if session.results.is_empty() {
                    return StepOutcome::replies(vec![
                        MessageIntent::text("There is no finished quote to send yet."),
                        self.prompt_for(session),
                    ]);
                }
                let summary = format!(
                    "New quote request from conversation {}:\n\n{}",
                    session.conversation_id,
                    self.quote_summary(session)
                );
                let mut outcome = StepOutcome::reply(MessageIntent::text(
                    "Your quote was forwarded to our manager. We will get back to you soon.",
                ));
                outcome.admin_forward = Some(MessageIntent::text(summary));
                outcome
            }
            (Phase::Idle, Event::FreeText(_)) => StepOutcome::replies(vec![
                MessageIntent::text("Please use the menu buttons."),
                self.prompt_for(session),
            ]),

            (Phase::SelectingCategory, Event::Choice(Choice::PickCategory(category))) => {
                match category {
                    Category::WallPanels => self.advance(session, Phase::SelectingPanelProduct),
                    Category::Spc => self.advance(
                        session,
                        Phase::SelectingLength {
                            product: PanelProduct::SpcPanel,
                            thickness_mm: None,
                        },
                    ),
                    Category::Profiles => self.advance(session, Phase::SelectingProfileThickness),
                    Category::Slats => self.advance(session, Phase::SelectingSlatKind),
                    Category::ThreeD => self.advance(session, Phase::SelectingThreeDVariant),
                }
            }

            (Phase::SelectingPanelProduct, Event::Choice(Choice::PickProduct(product))) => {
                if product.has_thickness_choice() {
                    self.advance(session, Phase::SelectingThickness { product: *product })
                } else {
                    self.advance(
                        session,
                        Phase::SelectingLength { product: *product, thickness_mm: None },
                    )
                }
            }

            (
                Phase::SelectingThickness { product },
                Event::Choice(Choice::PickThickness(thickness_mm)),
            ) => {
                if !self.catalog.thicknesses_for(product).contains(thickness_mm) {
                    return self.discard_selection(
                        session,
                        "That thickness is not available for this product. Please choose again.",
                    );
                }
                self.advance(
                    session,
                    Phase::SelectingLength { product, thickness_mm: Some(*thickness_mm) },
                )
            }

            (
                Phase::SelectingLength { product, thickness_mm },
                Event::Choice(Choice::PickLength(length_mm)),
            ) => match self.catalog.panel(product, thickness_mm, *length_mm) {
                Ok(_) => {
                    session.selections.push(Selection::new(Material::Panel {
                        product,
                        thickness_mm,
                        length_mm: *length_mm,
                    }));
                    self.advance(session, Phase::ConfirmingCustomName)
                }
                Err(_) => self.discard_selection(
                    session,
                    "That variant is not in the catalog. Please choose again.",
                ),
            },

            (Phase::ConfirmingCustomName, Event::Choice(Choice::CustomName(wants_name))) => {
                if *wants_name {
                    self.advance(session, Phase::NamingSelection)
                } else {
                    self.advance(session, Phase::ChoosingNextStep)
                }
            }

            (Phase::NamingSelection, Event::FreeText(text)) => {
                let name = text.trim();
                if name.is_empty() {
                    return self.invalid_input(session, "The name cannot be empty.");
                }
                if let Some(selection) = session.selections.last_mut() {
                    selection.custom_name = Some(name.to_owned());
                }
                session.last_error = None;
                self.advance(session, Phase::ChoosingNextStep)
            }

            (
                Phase::SelectingProfileThickness,
                Event::Choice(Choice::PickProfileThickness(thickness_mm)),
            ) => {
                if !self.catalog.profile_thicknesses().contains(thickness_mm) {
                    return self.discard_selection(
                        session,
                        "That profile thickness is not available. Please choose again.",
                    );
                }
                self.advance(session, Phase::SelectingProfileKind { thickness_mm: *thickness_mm })
            }

            (
                Phase::SelectingProfileKind { thickness_mm },
                Event::Choice(Choice::PickProfileKind(kind)),
            ) => match self.catalog.profile(thickness_mm, *kind) {
                Ok(_) => self.advance(
                    session,
                    Phase::AwaitingProfileQuantity { thickness_mm, kind: *kind },
                ),
                Err(_) => self.discard_selection(
                    session,
                    "That profile is not in the catalog. Please choose again.",
                ),
            },

            (
                Phase::AwaitingProfileQuantity { thickness_mm, kind },
                Event::FreeText(text),
            ) => match parse_quantity(text) {
                Ok(quantity) => {
                    session.selections.push(Selection::new(Material::Profile {
                        thickness_mm,
                        kind,
                        quantity,
                    }));
                    session.last_error = None;
                    self.advance(session, Phase::ChoosingNextStep)
                }
                Err(error) => self.invalid_input(session, &error.to_string()),
            },

            (Phase::SelectingSlatKind, Event::Choice(Choice::PickSlatKind(kind))) => {
                session.selections.push(Selection::new(Material::Slats { kind: *kind }));
                self.advance(session, Phase::ChoosingNextStep)
            }

            (
                Phase::SelectingThreeDVariant,
                Event::Choice(Choice::PickThreeDVariant(variant)),
            ) => match self.catalog.three_d(*variant) {
                Ok(_) => {
                    session.selections.push(Selection::new(Material::ThreeD { variant: *variant }));
                    self.advance(session, Phase::ConfirmingCustomName)
                }
                Err(_) => self.discard_selection(
                    session,
                    "That 3D panel size is not in the catalog. Please choose again.",
                ),
            },

            (Phase::ChoosingNextStep, Event::Choice(Choice::AddAnotherMaterial(more))) => {
                if *more {
                    self.advance(session, Phase::SelectingCategory)
                } else {
                    self.begin_dimensions(session)
                }
            }

            (Phase::CollectingUnit, Event::Choice(Choice::PickUnit(unit))) => {
                session.unit = Some(*unit);
                self.advance(session, Phase::CollectingWidth)
            }

            (Phase::CollectingWidth, Event::FreeText(text)) => {
                match parse_measure(text, self.session_unit(session)) {
                    Ok(width_m) => {
                        session.room_width_m = Some(width_m);
                        session.last_error = None;
                        if session.selections.iter().any(Selection::covers_area) {
                            self.advance(session, Phase::CollectingHeight)
                        } else {
                            // Linear materials need the wall length only.
                            self.finalize(session)
                        }
                    }
                    Err(error) => self.invalid_input(session, &error.to_string()),
                }
            }

            (Phase::CollectingHeight, Event::FreeText(text)) => {
                match parse_measure(text, self.session_unit(session)) {
                    Ok(height_m) => {
                        session.room_height_m = Some(height_m);
                        session.last_error = None;
                        self.advance(session, Phase::CollectingOpenings { stage: OpeningStage::Ask })
                    }
                    Err(error) => self.invalid_input(session, &error.to_string()),
                }
            }

            (
                Phase::CollectingOpenings { stage: OpeningStage::Ask },
                Event::Choice(Choice::AnotherOpening(more)),
            ) => {
                if *more {
                    self.advance(session, Phase::CollectingOpenings { stage: OpeningStage::Size })
                } else if self.needs_height_mode(session) {
                    self.advance(session, Phase::ChoosingHeightMode)
                } else {
                    self.finalize(session)
                }
            }

            (
                Phase::CollectingOpenings { stage: OpeningStage::Size },
                Event::FreeText(text),
            ) => match parse_opening(text, self.session_unit(session)) {
                Ok((width_m, height_m)) => {
                    session.openings.push(Opening { width_m, height_m });
                    session.last_error = None;
                    self.advance(session, Phase::CollectingOpenings { stage: OpeningStage::Ask })
                }
                Err(error) => self.invalid_input(session, &error.to_string()),
            },

            (Phase::ChoosingHeightMode, Event::Choice(Choice::PickHeightMode(mode))) => {
                session.height_mode = Some(*mode);
                self.finalize(session)
            }

            // Everything else is the wrong event shape for the phase: no
            // state change, just guidance plus the same prompt again.
            (_, event) => self.unexpected_event(session, event),
        }
    }

    /// Moves to a new phase and replies with that phase's prompt.
    fn advance(&self, session: &mut Session, phase: Phase) -> StepOutcome {
        session.phase = phase;
        StepOutcome::reply(self.prompt_for(session))
    }

    /// Invalid free text: record the note, re-emit the same prompt, keep the
    /// phase untouched.
    fn invalid_input(&self, session: &mut Session, note: &str) -> StepOutcome {
        session.last_error = Some(note.to_owned());
        StepOutcome::replies(vec![
            MessageIntent::text(format!("That didn't work: {note}")),
            self.prompt_for(session),
        ])
    }

    fn unexpected_event(&self, session: &Session, event: &Event) -> StepOutcome {
        let note = match event {
            Event::Choice(choice) if session.materials_locked && is_selection_choice(choice) => {
                "Materials are locked for this quote. Finish the measurements, or send /start to begin a new calculation."
            }
            Event::Choice(_) => "That button doesn't apply right now.",
            Event::FreeText(_) => "I expected a button choice here, not text.",
        };
        StepOutcome::replies(vec![MessageIntent::text(note), self.prompt_for(session)])
    }

    /// Catalog miss during selection: drop the half-built choice and return
    /// to the category screen.
    fn discard_selection(&self, session: &mut Session, note: &str) -> StepOutcome {
        session.phase = Phase::SelectingCategory;
        StepOutcome::replies(vec![MessageIntent::text(note), self.prompt_for(session)])
    }

    fn session_unit(&self, session: &Session) -> Unit {
        session.unit.unwrap_or(Unit::Metres)
    }

    fn needs_height_mode(&self, session: &Session) -> bool {
        session
            .selections
            .iter()
            .any(|selection| matches!(selection.material, Material::Panel { .. }))
    }

    /// Locks the selection list and routes to the first dimension question
    /// the chosen materials actually need.
    fn begin_dimensions(&self, session: &mut Session) -> StepOutcome {
        if session.selections.is_empty() {
            session.phase = Phase::SelectingCategory;
            return StepOutcome::replies(vec![
                MessageIntent::text("Add at least one material first."),
                self.prompt_for(session),
            ]);
        }

        session.materials_locked = true;

        let needs_area = session.selections.iter().any(Selection::covers_area);
        let needs_length = session.selections.iter().any(Selection::covers_length);
        if !needs_area && !needs_length {
            // Piece-counted materials carry their own quantity.
            return self.finalize(session);
        }

        if session.unit.is_none() {
            self.advance(session, Phase::CollectingUnit)
        } else {
            self.advance(session, Phase::CollectingWidth)
        }
    }

    /// Produces one CalculationResult per locked selection, or rolls back to
    /// the opening loop when the deductions make net coverage non-positive.
    fn finalize(&self, session: &mut Session) -> StepOutcome {
        let deducted = session.deducted_area_m2();
        let mut results = Vec::new();
        let mut notes = Vec::new();

        for selection in &session.selections {
            let computed = match &selection.material {
                Material::Panel { product, thickness_mm, length_mm } => {
                    let Ok(variant) = self.catalog.panel(*product, *thickness_mm, *length_mm)
                    else {
                        notes.push(format!(
                            "{} is no longer in the catalog and was skipped.",
                            selection.display_name()
                        ));
                        continue;
                    };
                    let height_m = match session.height_mode {
                        Some(HeightMode::Material) => f64::from(*length_mm) / 1_000.0,
                        _ => session.room_height_m.unwrap_or(0.0),
                    };
                    let net_m2 =
                        session.room_width_m.unwrap_or(0.0) * height_m - deducted;
                    area_quote(net_m2, variant.unit_area_m2, variant.unit_price, self.reserve).map(
                        |quote| CalculationResult {
                            selection: selection.clone(),
                            quantity: Quantity::Units(quote.units),
                            purchased_coverage: quote.purchased_m2,
                            waste_amount: quote.waste_m2,
                            waste_percent: quote.waste_percent,
                            total_cost: quote.total_cost,
                        },
                    )
                }
                Material::ThreeD { variant } => {
                    let Ok(panel) = self.catalog.three_d(*variant) else {
                        notes.push(format!(
                            "{} is no longer in the catalog and was skipped.",
                            selection.display_name()
                        ));
                        continue;
                    };
                    let net_m2 = session.room_width_m.unwrap_or(0.0)
                        * session.room_height_m.unwrap_or(0.0)
                        - deducted;
                    area_quote(net_m2, panel.unit_area_m2, panel.unit_price, self.reserve).map(
                        |quote| CalculationResult {
                            selection: selection.clone(),
                            quantity: Quantity::Units(quote.units),
                            purchased_coverage: quote.purchased_m2,
                            waste_amount: quote.waste_m2,
                            waste_percent: quote.waste_percent,
                            total_cost: quote.total_cost,
                        },
                    )
                }
                Material::Slats { kind } => {
                    let Ok(slat) = self.catalog.slat(*kind) else {
                        notes.push(format!(
                            "{} is no longer in the catalog and was skipped.",
                            selection.display_name()
                        ));
                        continue;
                    };
                    length_quote(
                        session.room_width_m.unwrap_or(0.0),
                        slat.price_per_m,
                        self.reserve,
                    )
                    .map(|quote| CalculationResult {
                        selection: selection.clone(),
                        quantity: Quantity::LinearMetres(quote.metres),
                        purchased_coverage: f64::from(quote.metres),
                        waste_amount: quote.waste_m,
                        waste_percent: quote.waste_percent,
                        total_cost: quote.total_cost,
                    })
                }
                Material::Profile { thickness_mm, kind, quantity } => {
                    let Ok(profile) = self.catalog.profile(*thickness_mm, *kind) else {
                        notes.push(format!(
                            "{} is no longer in the catalog and was skipped.",
                            selection.display_name()
                        ));
                        continue;
                    };
                    piece_quote(*quantity, profile.unit_price).map(|quote| CalculationResult {
                        selection: selection.clone(),
                        quantity: Quantity::Pieces(quote.quantity),
                        purchased_coverage: 0.0,
                        waste_amount: 0.0,
                        waste_percent: 0.0,
                        total_cost: quote.total_cost,
                    })
                }
            };

            match computed {
                Ok(result) => results.push(result),
                Err(CalcError::InvalidDimensions { .. }) => {
                    return self.rollback_openings(session);
                }
                Err(error) => {
                    notes.push(format!(
                        "{} could not be calculated ({error}) and was skipped.",
                        selection.display_name()
                    ));
                }
            }
        }

        if results.is_empty() {
            session.phase = Phase::Idle;
            let mut replies: Vec<MessageIntent> =
                notes.into_iter().map(MessageIntent::text).collect();
            replies.push(MessageIntent::text("The quote came out empty. Let's start over."));
            replies.push(self.prompt_for(session));
            return StepOutcome::replies(replies);
        }

        session.results.extend(results);
        session.phase = Phase::Idle;

        let mut replies: Vec<MessageIntent> =
            notes.into_iter().map(MessageIntent::text).collect();
        replies.push(MessageIntent::with_options(
            self.quote_summary(session),
            vec![
                ("New calculation".to_owned(), Choice::StartCalculation),
                ("Send quote to our manager".to_owned(), Choice::SendToAdmin),
            ],
        ));
        StepOutcome::replies(replies)
    }

    /// Openings ate the whole wall: clear them and re-run the opening loop.
    fn rollback_openings(&self, session: &mut Session) -> StepOutcome {
        session.openings.clear();
        session.phase = Phase::CollectingOpenings { stage: OpeningStage::Ask };
        StepOutcome::replies(vec![
            MessageIntent::text(
                "The openings you entered cover the whole wall, so there is nothing left to clad. Let's re-enter them.",
            ),
            self.prompt_for(session),
        ])
    }

    fn quote_summary(&self, session: &Session) -> String {
        let mut lines = vec!["Your quote:".to_owned(), String::new()];
        for result in &session.results {
            let quantity = match result.quantity {
                Quantity::Units(units) => format!("{units} panels"),
                Quantity::LinearMetres(metres) => format!("{metres} linear m"),
                Quantity::Pieces(pieces) => format!("{pieces} pcs"),
            };
            let waste = match result.quantity {
                Quantity::Pieces(_) => String::new(),
                Quantity::Units(_) => format!(
                    ", waste {:.2} m² ({:.2}%)",
                    result.waste_amount, result.waste_percent
                ),
                Quantity::LinearMetres(_) => format!(
                    ", waste {:.2} m ({:.2}%)",
                    result.waste_amount, result.waste_percent
                ),
            };
            lines.push(format!(
                "• {}: {quantity}{waste} — {} ₽",
                result.selection.display_name(),
                result.total_cost
            ));
        }
        lines.push(String::new());
        lines.push(format!("Total: {} ₽", session.total_cost()));
        lines.join("\n")
    }

    /// The canonical prompt for the session's current phase. Re-emitted
    /// verbatim after every invalid or unexpected event.
    fn prompt_for(&self, session: &Session) -> MessageIntent {
        let unit = self.session_unit(session).label();
        match &session.phase {
            Phase::Idle => {
                let mut options =
                    vec![("Calculate materials".to_owned(), Choice::StartCalculation)];
                if !session.results.is_empty() {
                    options.push(("Send quote to our manager".to_owned(), Choice::SendToAdmin));
                }
                MessageIntent::with_options("What would you like to do?", options)
            }
            Phase::SelectingCategory => MessageIntent::with_options(
                "Choose a material category:",
                vec![
                    Category::WallPanels,
                    Category::Spc,
                    Category::Profiles,
                    Category::Slats,
                    Category::ThreeD,
                ]
                .into_iter()
                .map(|category| {
                    (category.display_name().to_owned(), Choice::PickCategory(category))
                })
                .collect(),
            ),
            Phase::SelectingPanelProduct => MessageIntent::with_options(
                "Choose a WPC panel type:",
                self.catalog
                    .panel_products()
                    .into_iter()
                    .filter(PanelProduct::has_thickness_choice)
                    .map(|product| {
                        (product.display_name().to_owned(), Choice::PickProduct(product))
                    })
                    .collect(),
            ),
            Phase::SelectingThickness { product } => MessageIntent::with_options(
                "Choose the thickness:",
                self.catalog
                    .thicknesses_for(*product)
                    .into_iter()
                    .map(|thickness| (format!("{thickness} mm"), Choice::PickThickness(thickness)))
                    .collect(),
            ),
            Phase::SelectingLength { product, thickness_mm } => MessageIntent::with_options(
                "Choose the panel length:",
                self.catalog
                    .lengths_for(*product, *thickness_mm)
                    .into_iter()
                    .map(|length| (format!("{length} mm"), Choice::PickLength(length)))
                    .collect(),
            ),
            Phase::ConfirmingCustomName => MessageIntent::with_options(
                "Do you know the exact name or article of this material?",
                vec![
                    ("Yes, I'll type it".to_owned(), Choice::CustomName(true)),
                    ("No, standard one".to_owned(), Choice::CustomName(false)),
                ],
            ),
            Phase::NamingSelection => MessageIntent::text("Enter the name or article:"),
            Phase::SelectingProfileThickness => MessageIntent::with_options(
                "Choose the profile thickness:",
                self.catalog
                    .profile_thicknesses()
                    .into_iter()
                    .map(|thickness| {
                        (format!("{thickness} mm"), Choice::PickProfileThickness(thickness))
                    })
                    .collect(),
            ),
            Phase::SelectingProfileKind { .. } => MessageIntent::with_options(
                "Choose the profile type:",
                vec![ProfileKind::Joining, ProfileKind::Finishing, ProfileKind::OuterCorner]
                    .into_iter()
                    .map(|kind| (kind.display_name().to_owned(), Choice::PickProfileKind(kind)))
                    .collect(),
            ),
            Phase::AwaitingProfileQuantity { .. } => {
                MessageIntent::text("How many pieces do you need?")
            }
            Phase::SelectingSlatKind => MessageIntent::with_options(
                "Choose the slat type:",
                vec![SlatKind::Wpc, SlatKind::Wood]
                    .into_iter()
                    .map(|kind| (kind.display_name().to_owned(), Choice::PickSlatKind(kind)))
                    .collect(),
            ),
            Phase::SelectingThreeDVariant => MessageIntent::with_options(
                "Choose the 3D panel size:",
                self.catalog
                    .three_d_panels()
                    .iter()
                    .map(|panel| {
                        (
                            panel.variant.display_name().to_owned(),
                            Choice::PickThreeDVariant(panel.variant),
                        )
                    })
                    .collect(),
            ),
            Phase::ChoosingNextStep => MessageIntent::with_options(
                "Material added. Add another one, or proceed to measurements?",
                vec![
                    ("Add another material".to_owned(), Choice::AddAnotherMaterial(true)),
                    ("Proceed to measurements".to_owned(), Choice::AddAnotherMaterial(false)),
                ],
            ),
            Phase::CollectingUnit => MessageIntent::with_options(
                "Which units are more convenient for you?",
                vec![
                    ("Metres (m)".to_owned(), Choice::PickUnit(Unit::Metres)),
                    ("Millimetres (mm)".to_owned(), Choice::PickUnit(Unit::Millimetres)),
                ],
            ),
            Phase::CollectingWidth => MessageIntent::text(format!(
                "Enter the wall width in {unit}. You can sum several segments with +, e.g. 3+1.2+2."
            )),
            Phase::CollectingHeight => {
                MessageIntent::text(format!("Enter the wall height in {unit}."))
            }
            Phase::CollectingOpenings { stage: OpeningStage::Ask } => MessageIntent::with_options(
                "Any windows or doors to deduct from this wall?",
                vec![
                    ("Yes, add an opening".to_owned(), Choice::AnotherOpening(true)),
                    ("No, continue".to_owned(), Choice::AnotherOpening(false)),
                ],
            ),
            Phase::CollectingOpenings { stage: OpeningStage::Size } => MessageIntent::text(
                format!("Enter the opening size as width x height ({unit}), e.g. 1.2 x 0.9."),
            ),
            Phase::ChoosingHeightMode => MessageIntent::with_options(
                "Which height should the panels cover?",
                vec![
                    ("Room height".to_owned(), Choice::PickHeightMode(HeightMode::Room)),
                    ("Full panel length".to_owned(), Choice::PickHeightMode(HeightMode::Material)),
                ],
            ),
        }
    }
}

fn is_selection_choice(choice: &Choice) -> bool {
    matches!(
        choice,
        Choice::StartCalculation
            | Choice::PickCategory(_)
            | Choice::PickProduct(_)
            | Choice::PickThickness(_)
            | Choice::PickLength(_)
            | Choice::PickProfileThickness(_)
            | Choice::PickProfileKind(_)
            | Choice::PickSlatKind(_)
            | Choice::PickThreeDVariant(_)
            | Choice::AddAnotherMaterial(_)
    )
}

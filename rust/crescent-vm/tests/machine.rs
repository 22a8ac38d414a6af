//! End-to-end tests: load a script and run it on small hand-built networks.

use crescent_core::{Program, Topology, Value};
use crescent_vm::{
    BinaryOp, DebugEvent, ErrorCategory, Machine, Operation, OperationTable, UnaryOp, VmError,
    LONDON_HOME,
};
use std::cell::RefCell;
use std::rc::Rc;
use std::sync::Arc;

/// `Home` and `A`, both served by `R1`.
fn home_and_a() -> Arc<Topology> {
    Arc::new(
        Topology::builder("Home")
            .station("Home", ["R1"])
            .station("A", ["R1"])
            .build()
            .unwrap(),
    )
}

/// Every station with a London role plus a few plain ones, all on one line.
fn one_line_london() -> Arc<Topology> {
    let table = OperationTable::london();
    let mut builder = Topology::builder(LONDON_HOME);
    for (station, _) in table.iter() {
        builder = builder.station(station.clone(), ["Tube"]);
    }
    for plain in ["Oxford Circus", "Baker Street", "Bond Street"] {
        builder = builder.station(plain, ["Tube"]);
    }
    Arc::new(builder.build().unwrap())
}

fn tube_script(stations: &[&str]) -> String {
    stations
        .iter()
        .map(|s| format!("Take Tube Line to {}\n", s))
        .collect()
}

fn london_machine(stations: &[&str], input: Value) -> Machine {
    Machine::new(
        Program::load(&tube_script(stations)),
        one_line_london(),
        Arc::new(OperationTable::london()),
        input,
    )
}

fn record_steps(machine: Machine) -> (Machine, Rc<RefCell<Vec<usize>>>) {
    let ips = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&ips);
    let machine = machine.with_debug_callback(move |event| {
        if let DebugEvent::Step { ip, .. } = event {
            sink.borrow_mut().push(*ip);
        }
    });
    (machine, ips)
}

// ─── Halting ───

#[test]
fn round_trip_swaps_then_emits() {
    let mut m = Machine::new(
        Program::load("Take R1 Line to A\nTake R1 Line to Home"),
        home_and_a(),
        Arc::new(OperationTable::new("Home")),
        Value::from("5"),
    );

    assert!(!m.has_finished().unwrap());
    m.step().unwrap();
    assert_eq!(m.location().as_str(), "A");
    assert_eq!(m.accumulator(), &Value::from("A"));
    assert_eq!(m.cell("A"), Some(&Value::from("5")));
    assert!(!m.has_finished().unwrap());

    m.step().unwrap();
    assert_eq!(m.location().as_str(), "Home");
    assert_eq!(m.output, vec!["A".to_string()]);
    assert!(m.has_finished().unwrap());
}

#[test]
fn emit_writes_accumulator_after_coming_back() {
    // Visiting A twice puts the input back in the accumulator before Home.
    let mut m = Machine::new(
        Program::load("Take R1 Line to A\nTake R1 Line to A\nTake R1 Line to Home"),
        home_and_a(),
        Arc::new(OperationTable::new("Home")),
        Value::from("5"),
    );
    m.run().unwrap();
    assert_eq!(m.take_output(), vec!["5".to_string()]);
    assert!(m.output.is_empty());
    assert_eq!(m.steps(), 3);
}

#[test]
fn running_off_the_end_away_from_home_is_fatal() {
    let mut m = Machine::new(
        Program::load("Take R1 Line to A"),
        home_and_a(),
        Arc::new(OperationTable::new("Home")),
        Value::from("5"),
    );
    m.step().unwrap();
    let err = m.has_finished().unwrap_err();
    assert!(err.is_unterminated());
    assert_eq!(err.category(), ErrorCategory::Structural);
    assert!(err.to_string().contains("you have to end at Home"));
}

#[test]
fn unterminated_regardless_of_values() {
    for input in [Value::from("5"), Value::from(0), Value::from(-12), Value::empty_text()] {
        let mut m = Machine::new(
            Program::load("Take R1 Line to A\nTake R1 Line to A\nTake R1 Line to A"),
            home_and_a(),
            Arc::new(OperationTable::new("Home")),
            input,
        );
        let err = m.run().unwrap_err();
        assert!(err.is_unterminated(), "{}", err);
    }
}

#[test]
fn stops_at_first_return_home() {
    // Instructions after the first homecoming never run.
    let mut m = Machine::new(
        Program::load("Take R1 Line to A\nTake R1 Line to Home\nTake R9 Line to Nowhere"),
        home_and_a(),
        Arc::new(OperationTable::new("Home")),
        Value::from("x"),
    );
    m.run().unwrap();
    assert_eq!(m.instruction_pointer(), 2);
}

// ─── Connectivity ───

#[test]
fn illegal_journeys_abort_with_index() {
    let topology = Arc::new(
        Topology::builder("Home")
            .station("Home", ["R1"])
            .station("A", ["R1", "R2"])
            .station("B", ["R2"])
            .build()
            .unwrap(),
    );
    let cases = [
        ("Take R3 Line to A", "R3 Line doesn't exist"),
        ("Take R1 Line to C", "station C doesn't exist"),
        ("Take R2 Line to A", "station Home doesn't have access to R2 Line"),
        ("Take R1 Line to B", "station B doesn't have access to R1 Line"),
    ];
    for (script, message) in cases {
        let mut m = Machine::new(
            Program::load(script),
            Arc::clone(&topology),
            Arc::new(OperationTable::new("Home")),
            Value::from("5"),
        );
        let err = m.step().unwrap_err();
        assert_eq!(err.category(), ErrorCategory::Topology);
        assert_eq!(err.instruction_index(), Some(0));
        assert!(err.to_string().starts_with(message), "{}", err);
        assert_eq!(m.location().as_str(), "Home");
        assert_eq!(m.accumulator(), &Value::from("5"));
    }
}

// ─── Swap fallback ───

#[test]
fn plain_swap_is_an_involution() {
    let mut m = london_machine(&["Oxford Circus", "Oxford Circus"], Value::from(42));
    m.step().unwrap();
    assert_eq!(m.accumulator(), &Value::from("Oxford Circus"));
    assert_eq!(m.cell("Oxford Circus"), Some(&Value::from(42)));
    m.step().unwrap();
    assert_eq!(m.accumulator(), &Value::from(42));
    assert_eq!(m.cell("Oxford Circus"), Some(&Value::from("Oxford Circus")));
}

#[test]
fn inapplicable_operators_behave_like_plain_swap() {
    // Every operator station still holds its own name (Text), so with a Text
    // accumulator all the Integer-only operators and the Text+Integer ones
    // are inapplicable.
    let stations = [
        "Upminster",
        "Chalfont & Latimer",
        "Cannon Street",
        "Preston Road",
        "Bounds Green",
        "Manor House",
        "Holland Park",
        "Turnham Green",
        "Stepney Green",
        "Russell Square",
        "Notting Hill Gate",
        "Gunnersbury",
        "Mile End",
    ];
    for station in stations {
        let mut operated = london_machine(&[station], Value::from("acc"));
        let mut plain = london_machine(&["Oxford Circus"], Value::from("acc"));
        operated.step().unwrap();
        plain.step().unwrap();
        assert_eq!(operated.accumulator(), &Value::from(station), "{}", station);
        assert_eq!(operated.cell(station), plain.cell("Oxford Circus"), "{}", station);
        assert!(operated.call_stack().is_empty());
        assert!(operated.output.is_empty());
    }

    // Text-only operators with an Integer cell.
    for station in ["Upney", "Hounslow Central", "Turnpike Lane"] {
        let mut m = london_machine(&[station, station], Value::from(9));
        m.step().unwrap();
        // The first visit combined (cell was Text); now the cell holds 9.
        assert_eq!(m.cell(station), Some(&Value::from(9)));
        let acc = m.accumulator().clone();
        m.step().unwrap();
        assert_eq!(m.accumulator(), &Value::from(9), "{}", station);
        assert_eq!(m.cell(station), Some(&acc), "{}", station);
    }

    // Concatenation needs Text on both sides.
    let mut m = london_machine(&["Paddington"], Value::from(3));
    m.step().unwrap();
    assert_eq!(m.accumulator(), &Value::from("Paddington"));
    assert_eq!(m.cell("Paddington"), Some(&Value::from(3)));

    // Parsing needs a Text accumulator.
    let mut m = london_machine(&["Parsons Green"], Value::from(3));
    m.step().unwrap();
    assert_eq!(m.accumulator(), &Value::from("Parsons Green"));
    assert_eq!(m.cell("Parsons Green"), Some(&Value::from(3)));
}

// ─── Operators ───

#[test]
fn arithmetic_on_parsed_input() {
    // 12 parsed from the input, 7 from Seven Sisters, added at Upminster.
    let mut m = london_machine(
        &[
            "Parsons Green",
            "Seven Sisters",
            "Upminster",
            "Oxford Circus",
            "Oxford Circus",
            LONDON_HOME,
        ],
        Value::from("12 apples"),
    );
    m.step().unwrap();
    assert_eq!(m.accumulator(), &Value::from(12));
    assert_eq!(m.cell("Parsons Green"), Some(&Value::from(" apples")));

    m.step().unwrap();
    assert_eq!(m.accumulator(), &Value::from(7));
    // The parsed 12 is overwritten, not stored.
    assert_eq!(m.cell("Seven Sisters"), Some(&Value::from("Seven Sisters")));

    // Upminster still holds its name, so the addition falls back to a swap.
    m.step().unwrap();
    assert_eq!(m.accumulator(), &Value::from("Upminster"));
    assert_eq!(m.cell("Upminster"), Some(&Value::from(7)));

    m.run().unwrap();
    assert_eq!(m.output, vec!["Upminster".to_string()]);
}

#[test]
fn add_with_both_integers() {
    // The second Seven Sisters visit leaves 7 in the accumulator while
    // Upminster holds the first 7.
    let mut m = london_machine(
        &["Seven Sisters", "Upminster", "Seven Sisters", "Upminster", LONDON_HOME],
        Value::from("x"),
    );
    m.run().unwrap();
    assert_eq!(m.output, vec!["14".to_string()]);
    assert_eq!(m.cell("Upminster"), Some(&Value::from(7)));
}

#[test]
fn seven_sisters_leaves_its_cell_alone() {
    let mut m = london_machine(
        &["Seven Sisters", "Seven Sisters", "Upminster"],
        Value::from("hello"),
    );
    m.step().unwrap();
    assert_eq!(m.accumulator(), &Value::from(7));
    assert_eq!(m.cell("Seven Sisters"), Some(&Value::from("Seven Sisters")));
    m.step().unwrap();
    assert_eq!(m.accumulator(), &Value::from(7));
    assert_eq!(m.cell("Seven Sisters"), Some(&Value::from("Seven Sisters")));
    // The input was dropped rather than parked anywhere.
    m.step().unwrap();
    assert!(m.cells().values().all(|v| *v != Value::from("hello")));
}

#[test]
fn custom_roles_on_synthetic_network() {
    let topology = Arc::new(
        Topology::builder("Home")
            .station("Home", ["R1"])
            .station("A", ["R1"])
            .station("B", ["R1"])
            .build()
            .unwrap(),
    );
    let table = OperationTable::new("Home")
        .with("A", Operation::Binary(BinaryOp::Multiply))
        .with("B", Operation::Unary(UnaryOp::Constant(6)));
    let script = "Take R1 Line to B\nTake R1 Line to A\nTake R1 Line to B\n\
                  Take R1 Line to A\nTake R1 Line to Home";
    let mut m = Machine::new(Program::load(script), topology, Arc::new(table), Value::from("x"));
    m.run().unwrap();
    assert_eq!(m.output, vec!["36".to_string()]);
}

#[test]
fn concatenation_and_case() {
    let mut m = london_machine(
        &["Paddington", "Upney", "Oxford Circus", "Oxford Circus", LONDON_HOME],
        Value::from("!"),
    );
    m.step().unwrap();
    assert_eq!(m.accumulator(), &Value::from("Paddington!"));
    assert_eq!(m.cell("Paddington"), Some(&Value::from("!")));
    m.step().unwrap();
    // Upney upper-cases its own cell, not the accumulator.
    assert_eq!(m.accumulator(), &Value::from("UPNEY"));
    assert_eq!(m.cell("Upney"), Some(&Value::from("Paddington!")));
    m.run().unwrap();
    assert_eq!(m.output, vec!["UPNEY".to_string()]);
}

#[test]
fn substring_with_integer_accumulator() {
    let mut m = london_machine(&["Seven Sisters", "Gunnersbury"], Value::from("x"));
    m.step().unwrap();
    m.step().unwrap();
    assert_eq!(m.accumulator(), &Value::from("Gunners"));
    assert_eq!(m.cell("Gunnersbury"), Some(&Value::from(7)));
}

#[test]
fn negative_substring_length_raises_without_mutation() {
    // Notting Hill Gate complements 7 → -8 in the accumulator.
    let mut m = london_machine(
        &["Seven Sisters", "Notting Hill Gate", "Notting Hill Gate", "Mile End"],
        Value::from("x"),
    );
    m.step().unwrap(); // acc 7, SS untouched
    m.step().unwrap(); // NHG holds its name: swap. acc "Notting Hill Gate", NHG = 7
    m.step().unwrap(); // NHG holds 7: acc = -8, NHG = "Notting Hill Gate"
    assert_eq!(m.accumulator(), &Value::from(-8));

    let location = m.location().clone();
    let cells = m.cells().clone();
    let ip = m.instruction_pointer();
    let err = m.step().unwrap_err();
    assert!(err.is_invalid_operand());
    assert_eq!(err.category(), ErrorCategory::Operand);
    assert_eq!(err.instruction_index(), Some(3));
    assert_eq!(m.location(), &location);
    assert_eq!(m.accumulator(), &Value::from(-8));
    assert_eq!(m.cells(), &cells);
    assert_eq!(m.instruction_pointer(), ip);
}

#[test]
fn char_code_works_on_the_cell() {
    let mut m = london_machine(
        &["Charing Cross", "Charing Cross", "Charing Cross"],
        Value::from("z"),
    );
    m.step().unwrap();
    assert_eq!(m.accumulator(), &Value::from(67));
    assert_eq!(m.cell("Charing Cross"), Some(&Value::from("z")));
    m.step().unwrap();
    assert_eq!(m.accumulator(), &Value::from(122));
    assert_eq!(m.cell("Charing Cross"), Some(&Value::from(67)));
    m.step().unwrap();
    assert_eq!(m.accumulator(), &Value::from("C"));
    assert_eq!(m.cell("Charing Cross"), Some(&Value::from(122)));
}

// ─── Control ───

#[test]
fn store_writes_hammersmith_too() {
    let mut m = london_machine(&["Bank", "Oxford Circus", "Hammersmith"], Value::from("kept"));
    m.step().unwrap();
    assert_eq!(m.accumulator(), &Value::from("Bank"));
    assert_eq!(m.cell("Bank"), Some(&Value::from("kept")));
    assert_eq!(m.cell("Hammersmith"), Some(&Value::from("kept")));

    m.step().unwrap();
    assert_eq!(m.accumulator(), &Value::from("Oxford Circus"));

    m.step().unwrap();
    assert_eq!(m.accumulator(), &Value::from("kept"));
    assert_eq!(m.cell("Hammersmith"), Some(&Value::from("kept")));
}

#[test]
fn mark_and_unmark() {
    let mut m = london_machine(
        &["Temple", "Temple", "Marble Arch", "Marble Arch", "Marble Arch"],
        Value::from("a"),
    );
    m.step().unwrap();
    m.step().unwrap();
    assert_eq!(m.call_stack().len(), 2);
    assert_eq!(m.call_stack()[1].ip, 1);
    assert_eq!(m.call_stack()[0].location.as_str(), "Temple");
    // Marking never swaps.
    assert_eq!(m.accumulator(), &Value::from("a"));
    assert_eq!(m.cell("Temple"), Some(&Value::from("Temple")));

    m.step().unwrap();
    m.step().unwrap();
    assert!(m.call_stack().is_empty());
    let err = m.step().unwrap_err();
    assert!(err.is_empty_stack());
    assert_eq!(err.category(), ErrorCategory::Control);
    assert_eq!(err.instruction_index(), Some(4));
}

#[test]
fn branch_loops_until_accumulator_is_zero() {
    // Parsons Green peels one number off the input per pass. Visiting it
    // with an Integer accumulator swaps the remaining text back in.
    let stations = [
        "Parsons Green", // 0: acc 3, cell ",2,1,0"
        "Temple",        // 1: mark
        "Parsons Green", // 2: swap remaining text back into the accumulator
        "Parsons Green", // 3: parse the next number
        "Angel",         // 4: back to 2 while nonzero
        "Marble Arch",   // 5: drop the mark
        LONDON_HOME,     // 6
    ];
    let (mut m, ips) = record_steps(london_machine(&stations, Value::from("3,2,1,0")));
    m.run().unwrap();

    assert_eq!(m.output, vec!["0".to_string()]);
    assert!(m.call_stack().is_empty());
    assert_eq!(
        *ips.borrow(),
        vec![0, 1, 2, 3, 4, 2, 3, 4, 2, 3, 4, 5, 6],
        "re-enters right after the mark, falls through at zero"
    );
}

#[test]
fn branch_returns_to_marking_station() {
    let mut m = london_machine(&["Temple", "Seven Sisters", "Angel"], Value::from("x"));
    m.step().unwrap();
    m.step().unwrap();
    m.step().unwrap();
    assert_eq!(m.location().as_str(), "Temple");
    assert_eq!(m.instruction_pointer(), 1);
    // The mark stays on the stack.
    assert_eq!(m.call_stack().len(), 1);
}

#[test]
fn branch_with_text_accumulator_falls_through() {
    let mut m = london_machine(&["Temple", "Angel"], Value::from("1"));
    m.step().unwrap();
    m.step().unwrap();
    assert_eq!(m.location().as_str(), "Angel");
    assert_eq!(m.instruction_pointer(), 2);
    assert_eq!(m.accumulator(), &Value::from("1"));
    assert_eq!(m.cell("Angel"), Some(&Value::from("Angel")));
}

#[test]
fn taken_branch_without_mark_is_an_error() {
    let mut m = london_machine(&["Seven Sisters", "Angel"], Value::from("x"));
    m.step().unwrap();
    let err = m.step().unwrap_err();
    assert!(matches!(err.kind(), VmError::EmptyStack));
}

#[test]
fn shared_topology_serves_independent_runs() {
    let topology = one_line_london();
    let table = Arc::new(OperationTable::london());
    let script = tube_script(&["Oxford Circus", "Oxford Circus", LONDON_HOME]);
    let outputs: Vec<Vec<String>> = ["first", "second"]
        .into_iter()
        .map(|input| {
            let mut m = Machine::new(
                Program::load(&script),
                Arc::clone(&topology),
                Arc::clone(&table),
                Value::from(input),
            );
            m.run().unwrap();
            m.output
        })
        .collect();
    assert_eq!(outputs, vec![vec!["first".to_string()], vec!["second".to_string()]]);
}
